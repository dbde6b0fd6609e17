//! Request extractors.

use std::convert::Infallible;

use axum::Json;
use axum::extract::{FromRequest, FromRequestParts, Multipart, Request};
use axum::http::header::CONTENT_TYPE;
use axum::http::request::Parts;
use common::Actor;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::ApiError;
use crate::uploads::UploadedFile;

/// Header carrying the caller identity recorded in audit fields.
pub const ACTOR_HEADER: &str = "x-user-id";

/// Multipart field holding the profile picture.
pub const PICTURE_FIELD: &str = "user_profile";

const PICTURE_KEYS: [&str; 3] = ["user_profile", "profile", "profilePictureRef"];

/// The caller performing a mutation. Falls back to the system actor when
/// the request carries no identity.
#[derive(Debug, Clone)]
pub struct RequestActor(pub Actor);

impl<S> FromRequestParts<S> for RequestActor
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let actor = parts
            .headers
            .get(ACTOR_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(Actor::user)
            .unwrap_or_else(Actor::system);
        Ok(Self(actor))
    }
}

/// JSON body whose rejections use the API envelope.
#[derive(Debug)]
pub struct Payload<T>(pub T);

impl<S, T> FromRequest<S> for Payload<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
        Ok(Self(value))
    }
}

/// Customer fields sent either as `multipart/form-data` (with an optional
/// profile picture) or as a JSON object.
#[derive(Debug, Default)]
pub struct CustomerForm {
    fields: Map<String, Value>,
    pub picture: Option<UploadedFile>,
}

impl CustomerForm {
    pub fn from_fields(fields: Map<String, Value>) -> Result<Self, ApiError> {
        let mut form = Self {
            fields,
            picture: None,
        };
        form.normalize_addresses()?;
        Ok(form)
    }

    /// Deserializes the fields into `T`. A stored picture name replaces
    /// any picture reference sent as text.
    pub fn into_input<T: DeserializeOwned>(mut self, picture_ref: Option<String>) -> Result<T, ApiError> {
        if let Some(name) = picture_ref {
            for key in PICTURE_KEYS {
                self.fields.remove(key);
            }
            self.fields
                .insert("profilePictureRef".to_string(), Value::String(name));
        }
        serde_json::from_value(Value::Object(self.fields))
            .map_err(|e| ApiError::BadRequest(format!("Invalid request body: {e}")))
    }

    // Form clients send the address list as a JSON string.
    fn normalize_addresses(&mut self) -> Result<(), ApiError> {
        let Some(Value::String(raw)) = self.fields.get("addresses") else {
            return Ok(());
        };
        if raw.trim().is_empty() {
            self.fields.remove("addresses");
            return Ok(());
        }
        let parsed: Value = serde_json::from_str(raw)
            .map_err(|_| ApiError::BadRequest("Invalid address format".to_string()))?;
        if !parsed.is_array() {
            return Err(ApiError::BadRequest("Invalid address format".to_string()));
        }
        self.fields.insert("addresses".to_string(), parsed);
        Ok(())
    }

    async fn from_multipart(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut fields = Map::new();
        let mut picture = None;

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?
        {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            if name == PICTURE_FIELD && field.file_name().is_some() {
                let file_name = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(e.body_text()))?;
                if !bytes.is_empty() {
                    picture = Some(UploadedFile {
                        file_name,
                        content_type,
                        bytes: bytes.to_vec(),
                    });
                }
                continue;
            }

            let text = field
                .text()
                .await
                .map_err(|e| ApiError::BadRequest(e.body_text()))?;
            fields.insert(name, Value::String(text));
        }

        let mut form = Self::from_fields(fields)?;
        form.picture = picture;
        Ok(form)
    }
}

impl<S> FromRequest<S> for CustomerForm
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("multipart/form-data"));

        if is_multipart {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
            return Self::from_multipart(multipart).await;
        }

        let Payload(fields) = Payload::<Map<String, Value>>::from_request(req, state).await?;
        Self::from_fields(fields)
    }
}
