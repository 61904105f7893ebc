//! Same-origin JSON requests over `window.fetch`.

use crate::cascade::{LookupError, LookupRequest, OptionLookup};
use serde::de::DeserializeOwned;
use serde_json::Value;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{FormData, Request, RequestCredentials, RequestInit, Response, UrlSearchParams};

/// [`OptionLookup`] backed by `fetch`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpLookup;

impl OptionLookup for HttpLookup {
    async fn fetch(&self, request: LookupRequest) -> Result<Value, LookupError> {
        get_json(&request.endpoint, &request.params).await
    }
}

pub async fn get_json<T: DeserializeOwned>(
    endpoint: &str,
    params: &[(String, String)],
) -> Result<T, LookupError> {
    let url = with_query(endpoint, params)?;
    let init = RequestInit::new();
    init.set_method("GET");
    init.set_credentials(RequestCredentials::SameOrigin);
    send_json(&url, &init).await
}

/// POSTs `fields` as multipart form data.
pub async fn post_form<T: DeserializeOwned>(
    endpoint: &str,
    fields: &[(&str, String)],
) -> Result<T, LookupError> {
    let form = FormData::new().map_err(js_error)?;
    for (name, value) in fields {
        form.append_with_str(name, value).map_err(js_error)?;
    }
    let init = RequestInit::new();
    init.set_method("POST");
    init.set_credentials(RequestCredentials::SameOrigin);
    init.set_body(&form);
    send_json(endpoint, &init).await
}

fn with_query(endpoint: &str, params: &[(String, String)]) -> Result<String, LookupError> {
    if params.is_empty() {
        return Ok(endpoint.to_string());
    }
    let search = UrlSearchParams::new().map_err(js_error)?;
    for (name, value) in params {
        search.append(name, value);
    }
    let query = String::from(js_sys::Object::to_string(&search));
    let separator = if endpoint.contains('?') { '&' } else { '?' };
    Ok(format!("{}{}{}", endpoint, separator, query))
}

async fn send_json<T: DeserializeOwned>(url: &str, init: &RequestInit) -> Result<T, LookupError> {
    let window = web_sys::window().ok_or_else(|| LookupError::Network("no window".to_string()))?;
    let request = Request::new_with_str_and_init(url, init).map_err(js_error)?;
    request
        .headers()
        .set("Accept", "application/json")
        .map_err(js_error)?;

    let response: Response = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(js_error)?
        .dyn_into()
        .map_err(js_error)?;
    if !response.ok() {
        return Err(LookupError::Status(response.status()));
    }

    let body = JsFuture::from(response.text().map_err(js_error)?)
        .await
        .map_err(js_error)?
        .as_string()
        .ok_or_else(|| LookupError::Malformed("response body is not text".to_string()))?;
    serde_json::from_str(&body).map_err(|error| LookupError::Malformed(error.to_string()))
}

fn js_error(value: JsValue) -> LookupError {
    LookupError::Network(
        value
            .as_string()
            .unwrap_or_else(|| format!("{:?}", value)),
    )
}
