//! Demo request - ユーザーを ID で取得する
//!
//! The handler only simulates a lookup; it always answers with the same
//! name.

use async_trait::async_trait;
use mediator_core::{
    CancellationToken, HandlerModule, MediatorBuilder, RegistryError, Request, RequestHandler,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDto {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct GetUserByIdRequest {
    pub user_id: i32,
}

impl Request for GetUserByIdRequest {
    type Response = UserDto;
}

pub struct GetUserByIdHandler;

#[async_trait]
impl RequestHandler<GetUserByIdRequest> for GetUserByIdHandler {
    async fn handle(
        &self,
        request: GetUserByIdRequest,
        _cancel: &CancellationToken,
    ) -> anyhow::Result<UserDto> {
        Ok(UserDto {
            id: request.user_id,
            name: "Majid".to_string(),
        })
    }
}

/// Every handler this service ships with, each built fresh per request.
pub struct UsersModule;

impl HandlerModule for UsersModule {
    fn register(&self, builder: MediatorBuilder) -> Result<MediatorBuilder, RegistryError> {
        builder.request_handler_with::<GetUserByIdRequest, _>(|| GetUserByIdHandler)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(7)]
    #[case(0)]
    #[case(-3)]
    #[tokio::test]
    async fn handler_echoes_the_id(#[case] user_id: i32) {
        let user = GetUserByIdHandler
            .handle(GetUserByIdRequest { user_id }, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(user.id, user_id);
        assert_eq!(user.name, "Majid");
    }

    #[test]
    fn module_registers_the_lookup() {
        let registry = MediatorBuilder::new()
            .install(&UsersModule)
            .unwrap()
            .build_registry()
            .unwrap();
        assert!(registry.contains_request::<GetUserByIdRequest>());
    }

    #[test]
    fn user_serializes_as_plain_object() {
        let user = UserDto {
            id: 7,
            name: "Majid".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&user).unwrap(),
            serde_json::json!({ "id": 7, "name": "Majid" })
        );
    }
}
