//! 基于 reqwest 的远端 API 客户端
//!
//! - 持有 Bearer token（登录与确认设施后更新）
//! - 每个请求生成 x-request-id 并挂在 tracing span 上
//! - 非 2xx 响应按统一优先级提取错误信息
//! - 不重试；只有配置了超时才设置超时

use crate::api::{AccountApi, InstrumentApi, RoutineApi, TemplateFile};
use crate::convert::{
    create_template_request, dam_from_dto, instrument_type_from_dto, reading_to_dto,
    template_from_dto,
};
use crate::error::RemoteError;
use api_contract::{
    ApiEnvelope, AuthenticateRequest, CreateRoutineRequest, DamDto, InstrumentTemplateDto,
    InstrumentTypeDto, RoutineDto, RoutineUploadDto, SendReadingsRequest, error_message,
};
use async_trait::async_trait;
use domain::{Dam, InstrumentTemplate, InstrumentType, NewInstrumentTemplate, ReadingBatch};
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use std::sync::RwLock;
use std::time::{Duration, Instant};
use tracing::Instrument;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// HTTP 远端客户端。
pub struct HttpApiClient {
    base_url: String,
    http: reqwest::Client,
    token: RwLock<Option<String>>,
}

impl HttpApiClient {
    /// 创建客户端；`timeout` 为 None 时不设超时。
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self, RemoteError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
            token: RwLock::new(None),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// 当前持有的 token。
    pub fn token(&self) -> Option<String> {
        self.token.read().ok().and_then(|token| token.clone())
    }

    /// 替换持有的 token（例如复用已有会话）。
    pub fn set_token(&self, token: Option<String>) {
        if let Ok(mut current) = self.token.write() {
            *current = token;
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let mut builder = self.http.request(method, url);
        if let Some(token) = self.token() {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    /// 发送请求，返回 2xx 响应体文本。
    async fn execute(&self, builder: RequestBuilder, path: &str) -> Result<String, RemoteError> {
        let ids = dam_telemetry::new_request_ids();
        let span = tracing::info_span!(
            "remote_request",
            request_id = %ids.request_id,
            trace_id = %ids.trace_id,
            path = %path
        );
        let builder = builder.header(REQUEST_ID_HEADER, ids.request_id.as_str());

        async move {
            let started = Instant::now();
            let result = send_and_read(builder).await;
            let latency_ms = started.elapsed().as_millis() as u64;
            dam_telemetry::record_http_request(latency_ms, result.is_ok());
            match &result {
                Ok(_) => tracing::debug!(latency_ms, "request completed"),
                Err(err) => tracing::warn!(latency_ms, error = %err, "request failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn get_payload<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>, RemoteError> {
        let body = self.execute(self.request(Method::GET, path), path).await?;
        envelope_payload(&body)
    }
}

async fn send_and_read(builder: RequestBuilder) -> Result<String, RemoteError> {
    let response = builder.send().await?;
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(RemoteError::Api {
            status: status.as_u16(),
            message: error_message(&body),
        });
    }
    Ok(body)
}

/// 解析 `{result}` / `{value}` 封装；空响应体视为无载荷。
fn envelope_payload<T: DeserializeOwned>(body: &str) -> Result<Option<T>, RemoteError> {
    if body.trim().is_empty() {
        return Ok(None);
    }
    let envelope: ApiEnvelope<T> =
        serde_json::from_str(body).map_err(|err| RemoteError::Decode(err.to_string()))?;
    if envelope.success == Some(false) {
        return Err(RemoteError::Api {
            status: 200,
            message: envelope
                .message
                .unwrap_or_else(|| api_contract::DEFAULT_ERROR_MESSAGE.to_string()),
        });
    }
    Ok(envelope.into_payload())
}

#[async_trait]
impl AccountApi for HttpApiClient {
    async fn authenticate(&self, email: &str, password: &str) -> Result<String, RemoteError> {
        let path = "/User/authenticate";
        let request = AuthenticateRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let body = self
            .execute(self.request(Method::POST, path).json(&request), path)
            .await?;
        let token: String = envelope_payload(&body)?.ok_or(RemoteError::MissingResult)?;
        self.set_token(Some(token.clone()));
        tracing::info!("authenticated");
        Ok(token)
    }

    async fn list_dams(&self) -> Result<Vec<Dam>, RemoteError> {
        let dams: Vec<DamDto> = self
            .get_payload("/User/get-dams")
            .await?
            .unwrap_or_default();
        Ok(dams.into_iter().map(dam_from_dto).collect())
    }

    async fn confirm_client(&self, dam_id: &str) -> Result<String, RemoteError> {
        let path = "/User/confirm-client";
        // 请求体是 JSON 字符串本身
        let body = self
            .execute(self.request(Method::POST, path).json(&dam_id), path)
            .await?;
        let token: String = envelope_payload(&body)?.ok_or(RemoteError::MissingResult)?;
        self.set_token(Some(token.clone()));
        tracing::info!(dam_id = %dam_id, "facility confirmed");
        Ok(token)
    }
}

#[async_trait]
impl InstrumentApi for HttpApiClient {
    async fn list_templates(&self) -> Result<Vec<InstrumentTemplate>, RemoteError> {
        let templates: Vec<InstrumentTemplateDto> = self
            .get_payload("/Instrument/get-list-instruments-templates")
            .await?
            .unwrap_or_default();
        Ok(templates.into_iter().map(template_from_dto).collect())
    }

    async fn list_instrument_types(&self) -> Result<Vec<InstrumentType>, RemoteError> {
        let types: Vec<InstrumentTypeDto> = self
            .get_payload("/Instrument/get-instrument-types")
            .await?
            .unwrap_or_default();
        Ok(types.into_iter().map(instrument_type_from_dto).collect())
    }

    async fn create_template(&self, template: &NewInstrumentTemplate) -> Result<(), RemoteError> {
        if template.custom_name.trim().is_empty() {
            return Err(RemoteError::InvalidInput("custom name required".to_string()));
        }
        let path = "/Instrument/create-instrument-template";
        let request = create_template_request(template);
        self.execute(self.request(Method::POST, path).json(&request), path)
            .await?;
        Ok(())
    }

    async fn import_templates(&self, file: TemplateFile) -> Result<(), RemoteError> {
        if file.bytes.is_empty() {
            return Err(RemoteError::InvalidInput("file is empty".to_string()));
        }
        let path = "/Instrument/create-instrument-template-from-list";
        let part = reqwest::multipart::Part::bytes(file.bytes)
            .file_name(file.name)
            .mime_str(&file.mime)?;
        let form = reqwest::multipart::Form::new().part("file", part);
        self.execute(self.request(Method::POST, path).multipart(form), path)
            .await?;
        Ok(())
    }

    async fn send_readings(&self, batch: &ReadingBatch) -> Result<(), RemoteError> {
        let path = "/Instrument/send-instrument-readings";
        let request = SendReadingsRequest {
            readings: batch.readings.iter().map(reading_to_dto).collect(),
        };
        self.execute(self.request(Method::POST, path).json(&request), path)
            .await?;
        tracing::info!(readings = batch.len(), "readings sent");
        Ok(())
    }
}

#[async_trait]
impl RoutineApi for HttpApiClient {
    async fn list_routines(&self) -> Result<Vec<RoutineDto>, RemoteError> {
        Ok(self.get_payload("/Routine").await?.unwrap_or_default())
    }

    async fn create_routines(&self, routines: Vec<RoutineUploadDto>) -> Result<(), RemoteError> {
        let path = "/Routine/create-routine";
        let count = routines.len();
        let request = CreateRoutineRequest { routines };
        self.execute(self.request(Method::POST, path).json(&request), path)
            .await?;
        tracing::info!(routines = count, "routines sent");
        Ok(())
    }
}
