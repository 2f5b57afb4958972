use axum::{
    body::Bytes,
    extract::{FromRequest, Multipart, Request},
    response::{IntoResponse, Response},
};

use crate::error::ItemsError;

/// Multipart body of `POST /items`: text fields `name` and `category`, file field `image`.
#[derive(Debug)]
pub struct ItemForm {
    pub name: String,
    pub category: String,
    pub image: Bytes,
}

impl<S> FromRequest<S> for ItemForm
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let multipart = Multipart::from_request(req, state)
            .await
            .map_err(IntoResponse::into_response)?;
        read_fields(multipart)
            .await
            .map_err(IntoResponse::into_response)
    }
}

async fn read_fields(mut multipart: Multipart) -> Result<ItemForm, ItemsError> {
    let mut name = None;
    let mut category = None;
    let mut image = None;

    while let Some(field) = multipart.next_field().await? {
        let field_name = field.name().map(str::to_owned);
        match field_name.as_deref() {
            Some("name") => name = Some(field.text().await?),
            Some("category") => category = Some(field.text().await?),
            Some("image") => image = Some(field.bytes().await?),
            // Unknown fields are drained and ignored.
            _ => {
                field.bytes().await?;
            }
        }
    }

    Ok(ItemForm {
        name: name
            .filter(|s| !s.is_empty())
            .ok_or(ItemsError::MissingField("name"))?,
        category: category
            .filter(|s| !s.is_empty())
            .ok_or(ItemsError::MissingField("category"))?,
        image: image
            .filter(|b| !b.is_empty())
            .ok_or(ItemsError::MissingField("image"))?,
    })
}
