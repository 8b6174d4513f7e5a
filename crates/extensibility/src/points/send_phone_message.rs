//! `send-phone-message`: deliver a verification message by SMS or voice.
//!
//! The body carries the recipient, the rendered text and an optional context
//! describing why the message is sent. When a context is supplied its fields
//! are checked in order; `action` is only looked at once `message_type` is
//! known to be valid, and client fields only once `client` is an object.

use serde_json::Value;

use super::PointSchema;
use crate::validation::{FieldAccess, Fields, NestedFields};
use crate::{ContextObject, ExtensibilityPointType, JsonObject, ValidationError};

/// Allowed values of `context.message_type`.
pub const MESSAGE_TYPES: &[&str] = &["sms", "voice"];

/// Allowed values of `context.action`.
pub const ACTIONS: &[&str] = &["enrollment", "second-factor-authentication"];

/// `(recipient, text, context)`.
pub type SendPhoneMessageArgs = (String, String, ContextObject);

/// Schema of the send-phone-message point.
#[derive(Debug, Clone, Copy, Default)]
pub struct SendPhoneMessage;

impl PointSchema for SendPhoneMessage {
    type Args = SendPhoneMessageArgs;

    const POINT: ExtensibilityPointType = ExtensibilityPointType::SendPhoneMessage;
    const PARAMETERS: &'static [&'static str] = &["recipient", "text", "context"];

    fn validate(body: &Value, webtask: Value) -> Result<Self::Args, ValidationError> {
        let fields = Fields::body(body)?;
        let recipient = fields.string("recipient")?;
        let text = fields.string("text")?;

        let context = match fields.optional_object("context")? {
            Some(context) => {
                validate_context(&context)?;
                context.to_object()
            }
            None => JsonObject::new(),
        };

        Ok((recipient, text, ContextObject::new(context, webtask)))
    }
}

fn validate_context(context: &NestedFields<'_>) -> Result<(), ValidationError> {
    context.one_of("message_type", MESSAGE_TYPES)?;
    context.one_of("action", ACTIONS)?;
    context.string("language")?;
    context.string("code")?;
    context.optional_string("ip")?;
    context.optional_string("user_agent")?;

    if let Some(client) = context.optional_object("client")? {
        client.string("client_id")?;
        client.string("name")?;
        client.optional_object("client_metadata")?;
    }

    context.optional_object("user")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn validate(body: Value) -> Result<SendPhoneMessageArgs, ValidationError> {
        SendPhoneMessage::validate(&body, json!({}))
    }

    fn message(body: Value) -> String {
        validate(body).unwrap_err().to_string()
    }

    /// A context that passes every check; tests override one field at a time.
    fn full_context() -> Value {
        json!({
            "message_type": "sms",
            "action": "enrollment",
            "language": "korean",
            "code": "SOMEOTP12345",
            "ip": "127.0.0.1",
            "user_agent": "someAgent",
            "user": {},
            "client": {
                "client_id": "someClientId",
                "name": "Test Application",
                "client_metadata": {}
            }
        })
    }

    fn body_with_context(context: Value) -> Value {
        json!({ "recipient": "1-999-888-657-2134", "text": "dis iz a text", "context": context })
    }

    fn with(field: &str, value: Value) -> Value {
        let mut context = full_context();
        context[field] = value;
        body_with_context(context)
    }

    #[test]
    fn test_recipient_and_text_are_required() {
        assert_eq!(
            message(json!({ "text": "dis iz a text", "context": {} })),
            "Body.recipient received by extensibility point is not a string"
        );
        assert_eq!(
            message(json!({ "recipient": "1-999-888-657-2134", "context": {} })),
            "Body.text received by extensibility point is not a string"
        );
    }

    #[test]
    fn test_context_must_be_an_object() {
        assert_eq!(
            message(body_with_context(json!("context"))),
            "Body.context received by extensibility point is not an object"
        );
    }

    #[test]
    fn test_message_type_is_a_closed_enum() {
        assert_eq!(
            message(body_with_context(json!({ "message_type": "telephone" }))),
            "Body.context.message_type received by extensibility point is not `sms` or `voice`"
        );
    }

    #[test]
    fn test_action_is_checked_after_message_type() {
        assert_eq!(
            message(body_with_context(json!({ "message_type": "voice" }))),
            "Body.context.action received by extensibility point is not `enrollment` or `second-factor-authentication`"
        );
        assert_eq!(
            message(body_with_context(json!({ "message_type": "sms", "action": "wrong" }))),
            "Body.context.action received by extensibility point is not `enrollment` or `second-factor-authentication`"
        );
        assert_eq!(
            message(body_with_context(
                json!({ "message_type": "sms", "action": "second-factor-authentication" })
            )),
            "Body.context.language received by extensibility point is not a string"
        );
    }

    #[test]
    fn test_each_context_field_reports_its_path() {
        let cases = [
            ("language", json!({}), "Body.context.language received by extensibility point is not a string"),
            ("code", json!(12345), "Body.context.code received by extensibility point is not a string"),
            ("ip", json!(127), "Body.context.ip received by extensibility point is not a string"),
            ("user_agent", json!({}), "Body.context.user_agent received by extensibility point is not a string"),
            ("client", json!("123"), "Body.context.client received by extensibility point is not an object"),
            ("user", json!("someBadUserFormat"), "Body.context.user received by extensibility point is not an object"),
        ];

        for (field, value, expected) in cases {
            assert_eq!(message(with(field, value)), expected, "field {field}");
        }
    }

    #[test]
    fn test_client_fields_are_checked() {
        let cases = [
            (json!({ "client_id": 123 }), "Body.context.client.client_id received by extensibility point is not a string"),
            (json!({ "client_id": "id", "name": {} }), "Body.context.client.name received by extensibility point is not a string"),
            (
                json!({ "client_id": "id", "name": "Test Application", "client_metadata": "someBadData" }),
                "Body.context.client.client_metadata received by extensibility point is not an object",
            ),
        ];

        for (client, expected) in cases {
            assert_eq!(message(with("client", client)), expected);
        }
    }

    #[test]
    fn test_valid_payloads() {
        let (recipient, text, context) = validate(body_with_context(full_context())).unwrap();
        assert_eq!(recipient, "1-999-888-657-2134");
        assert_eq!(text, "dis iz a text");
        assert_eq!(context.get("message_type"), Some(&json!("sms")));
        assert!(context.webtask().is_some());

        let mut without_optional = full_context();
        for key in ["client", "ip", "user_agent", "user"] {
            without_optional.as_object_mut().unwrap().remove(key);
        }
        assert!(validate(body_with_context(without_optional)).is_ok());

        let (_, _, context) =
            validate(json!({ "recipient": "1", "text": "hi" })).unwrap();
        assert_eq!(context.len(), 1);
    }
}
