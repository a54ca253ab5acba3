use crate::{errors::ServiceError, services::attachments::Attachment};
use axum::{
    async_trait,
    extract::{FromRequest, Multipart, Request},
    http::header::CONTENT_TYPE,
    Form, Json,
};
use std::{collections::HashMap, fmt::Display, str::FromStr};

/// Name of the multipart part carrying an uploaded file
pub const ATTACHMENT_FIELD: &str = "attachment";

/// Flat text fields of a form-style request body.
///
/// Accepts `multipart/form-data` (with an optional file part named
/// `attachment`), `application/x-www-form-urlencoded`, or a JSON object whose
/// scalar values are read as text.
#[derive(Debug, Default)]
pub struct FormFields {
    values: HashMap<String, String>,
    attachment: Option<Attachment>,
}

#[async_trait]
impl<S> FromRequest<S> for FormFields
where
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        if content_type.starts_with("multipart/form-data") {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| ServiceError::BadRequest(e.body_text()))?;
            Self::from_multipart(multipart).await
        } else if content_type.starts_with("application/json") {
            let Json(object) = Json::<serde_json::Map<String, serde_json::Value>>::from_request(
                req, state,
            )
            .await
            .map_err(|e| ServiceError::BadRequest(e.body_text()))?;
            Ok(Self::from_json(object))
        } else {
            let Form(values) = Form::<HashMap<String, String>>::from_request(req, state)
                .await
                .map_err(|e| ServiceError::BadRequest(e.body_text()))?;
            Ok(Self {
                values,
                attachment: None,
            })
        }
    }
}

impl FormFields {
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            attachment: None,
        }
    }

    async fn from_multipart(mut multipart: Multipart) -> Result<Self, ServiceError> {
        let mut fields = Self::default();
        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            if name == ATTACHMENT_FIELD {
                let file_name = field.file_name().map(str::to_string);
                let bytes = field.bytes().await?;
                // browsers send an empty part when no file was picked
                let picked = !bytes.is_empty() || file_name.as_deref().is_some_and(|n| !n.is_empty());
                if picked {
                    fields.attachment = Some(Attachment {
                        file_name,
                        bytes: bytes.to_vec(),
                    });
                }
            } else {
                let text = field.text().await?;
                fields.values.insert(name, text);
            }
        }
        Ok(fields)
    }

    fn from_json(object: serde_json::Map<String, serde_json::Value>) -> Self {
        let values = object
            .into_iter()
            .filter_map(|(key, value)| match value {
                serde_json::Value::Null => None,
                serde_json::Value::String(s) => Some((key, s)),
                other => Some((key, other.to_string())),
            })
            .collect();
        Self {
            values,
            attachment: None,
        }
    }

    /// Trimmed value of `name`; blank counts as absent.
    pub fn optional(&self, name: &str) -> Option<&str> {
        self.values
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    pub fn required(&self, name: &str) -> Result<&str, ServiceError> {
        self.optional(name)
            .ok_or_else(|| ServiceError::ValidationError(format!("field `{name}` is required")))
    }

    pub fn parse_required<T>(&self, name: &str) -> Result<T, ServiceError>
    where
        T: FromStr,
        T::Err: Display,
    {
        parse_field(name, self.required(name)?)
    }

    pub fn parse_optional<T>(&self, name: &str) -> Result<Option<T>, ServiceError>
    where
        T: FromStr,
        T::Err: Display,
    {
        self.optional(name).map(|v| parse_field(name, v)).transpose()
    }

    pub fn take_attachment(&mut self) -> Option<Attachment> {
        self.attachment.take()
    }
}

fn parse_field<T>(name: &str, raw: &str) -> Result<T, ServiceError>
where
    T: FromStr,
    T::Err: Display,
{
    raw.parse::<T>().map_err(|e| {
        ServiceError::ValidationError(format!("invalid value for `{name}` ({raw:?}): {e}"))
    })
}
