//! User lifecycle points: pre/post user registration and post change password.
//!
//! All three receive the affected user and the context object.

use serde_json::Value;

use super::{context_object, PointSchema};
use crate::validation::{FieldAccess, Fields};
use crate::{ContextObject, ExtensibilityPointType, JsonObject, ValidationError};

/// `(user, context)`.
pub type UserLifecycleArgs = (JsonObject, ContextObject);

fn validate_user_payload(body: &Value, webtask: Value) -> Result<UserLifecycleArgs, ValidationError> {
    let fields = Fields::body(body)?;
    let user = fields.object_field("user")?.to_object();
    let context = context_object(&fields, webtask)?;
    Ok((user, context))
}

macro_rules! user_lifecycle_point {
    (
        $(#[$attr:meta])*
        $name:ident => $point:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $name;

        impl PointSchema for $name {
            type Args = UserLifecycleArgs;

            const POINT: ExtensibilityPointType = ExtensibilityPointType::$point;
            const PARAMETERS: &'static [&'static str] = &["user", "context"];

            fn validate(body: &Value, webtask: Value) -> Result<Self::Args, ValidationError> {
                validate_user_payload(body, webtask)
            }
        }
    };
}

user_lifecycle_point! {
    /// Schema of the pre-user-registration point.
    PreUserRegistration => PreUserRegistration
}

user_lifecycle_point! {
    /// Schema of the post-user-registration point.
    PostUserRegistration => PostUserRegistration
}

user_lifecycle_point! {
    /// Schema of the post-change-password point.
    PostChangePassword => PostChangePassword
}
