// src/http.rs
//! Minimal HTTP seam: a GET with query parameters and a timeout.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn get(
        &self,
        url: &str,
        query: &[(&str, String)],
        timeout: Duration,
    ) -> Result<HttpResponse>;
}

#[derive(Clone, Default)]
pub struct ReqwestHttp {
    client: Client,
}

impl ReqwestHttp {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }
}

#[async_trait]
impl HttpClient for ReqwestHttp {
    async fn get(
        &self,
        url: &str,
        query: &[(&str, String)],
        timeout: Duration,
    ) -> Result<HttpResponse> {
        let rsp = self
            .client
            .get(url)
            .query(query)
            .timeout(timeout)
            .send()
            .await
            .with_context(|| format!("GET {url}"))?;
        let status = rsp.status().as_u16();
        let body = rsp.text().await.context("reading response body")?;
        Ok(HttpResponse { status, body })
    }
}

// --- Test helper ---
/// Replays a canned response (or error) and records the query of every call.
pub struct StaticHttp {
    reply: std::result::Result<HttpResponse, String>,
    pub calls: Mutex<Vec<Vec<(String, String)>>>,
}

impl StaticHttp {
    pub fn ok(status: u16, body: impl Into<String>) -> Self {
        Self {
            reply: Ok(HttpResponse {
                status,
                body: body.into(),
            }),
            calls: Mutex::new(vec![]),
        }
    }

    pub fn failing(msg: impl Into<String>) -> Self {
        Self {
            reply: Err(msg.into()),
            calls: Mutex::new(vec![]),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or(0)
    }
}

#[async_trait]
impl HttpClient for StaticHttp {
    async fn get(
        &self,
        _url: &str,
        query: &[(&str, String)],
        _timeout: Duration,
    ) -> Result<HttpResponse> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(
                query
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.clone()))
                    .collect(),
            );
        }
        self.reply.clone().map_err(anyhow::Error::msg)
    }
}
