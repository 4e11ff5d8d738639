//! HTTP 传输实现
//!
//! 基于 `gloo-net` 的 fetch 封装，实现共享层的 `HttpClient` 接口。
//! multipart 请求使用浏览器 `FormData`，Content-Type（含 boundary）交给浏览器设置。

use async_trait::async_trait;
use gloo_net::http::{Method, RequestBuilder};
use ongchad_shared::TransportError;
use ongchad_shared::http::{
    FileUpload, HttpClient, HttpMethod, HttpRequest, HttpResponse, MultipartField, MultipartValue,
    RequestBody,
};
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Blob, BlobPropertyBag, FormData};

/// 浏览器 fetch 客户端
#[derive(Debug, Clone, Copy, Default)]
pub struct FetchClient;

fn to_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Delete => Method::DELETE,
    }
}

fn js_error(context: &str, e: JsValue) -> TransportError {
    TransportError::new(format!("{}: {:?}", context, e))
}

fn file_blob(file: &FileUpload) -> Result<Blob, TransportError> {
    let bytes = js_sys::Uint8Array::from(file.bytes.as_slice());
    let parts = js_sys::Array::new();
    parts.push(&bytes);

    let options = BlobPropertyBag::new();
    options.set_type(&file.content_type);
    Blob::new_with_u8_array_sequence_and_options(&parts, &options)
        .map_err(|e| js_error("failed to build blob", e))
}

fn form_data(fields: &[MultipartField]) -> Result<FormData, TransportError> {
    let form = FormData::new().map_err(|e| js_error("failed to create FormData", e))?;
    for field in fields {
        match &field.value {
            MultipartValue::Text(text) => form
                .append_with_str(&field.name, text)
                .map_err(|e| js_error("failed to append field", e))?,
            MultipartValue::File(file) => form
                .append_with_blob_and_filename(&field.name, &file_blob(file)?, &file.file_name)
                .map_err(|e| js_error("failed to append file", e))?,
        }
    }
    Ok(form)
}

#[async_trait(?Send)]
impl HttpClient for FetchClient {
    async fn send(&self, req: HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut builder = RequestBuilder::new(&req.url).method(to_method(req.method));
        for (key, value) in &req.headers {
            builder = builder.header(key, value);
        }

        let request = match &req.body {
            Some(RequestBody::Json(body)) => builder.body(body.as_str()),
            Some(RequestBody::Multipart(fields)) => builder.body(form_data(fields)?),
            None => builder.build(),
        }
        .map_err(|e| TransportError::new(format!("failed to build request: {}", e)))?;

        let response = request
            .send()
            .await
            .map_err(|e| TransportError::new(e.to_string()))?;

        let status = response.status();
        // 响应体读取失败按空体处理，状态码仍然有效
        let body = response.text().await.unwrap_or_default();
        Ok(HttpResponse { status, body })
    }
}

/// 读取 `<input type="file">` 选中的文件内容
pub async fn read_file(file: web_sys::File) -> Result<FileUpload, TransportError> {
    let buffer = JsFuture::from(file.array_buffer())
        .await
        .map_err(|e| js_error("failed to read file", e))?;
    let bytes = js_sys::Uint8Array::new(&buffer).to_vec();

    let content_type = match file.type_() {
        t if t.is_empty() => "application/octet-stream".to_string(),
        t => t,
    };
    Ok(FileUpload {
        file_name: file.name(),
        content_type,
        bytes,
    })
}
