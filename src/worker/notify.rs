use serde::Serialize;
use serde_json::Value;
use tracing::debug;

const DEFAULT_TITLE: &str = "StepToDeen";

/// "It is time for prayer"
const DEFAULT_BODY: &str = "نماز کا وقت ہو گیا ہے";

const ICON: &str = "./icons/icon-192.png";
const BADGE: &str = "./icons/icon-72.png";

/// Repeated prayer notifications replace each other instead of stacking.
const NOTIFICATION_TAG: &str = "prayer-notification";

const VIBRATE_PATTERN: [u32; 3] = [200, 100, 200];

/// Optional push payload: `{ "title"?: string, "body"?: string }`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PushPayload {
    pub title: Option<String>,
    pub body: Option<String>,
}

impl PushPayload {
    /// Parse raw push data. Missing or malformed data is treated as an
    /// empty payload so a push never fails.
    pub fn parse(data: Option<&[u8]>) -> Self {
        let Some(bytes) = data else {
            return Self::default();
        };
        let value: Value = match serde_json::from_slice(bytes) {
            Ok(value) => value,
            Err(e) => {
                debug!(error = %e, "Ignoring malformed push payload");
                return Self::default();
            }
        };

        // Each field stands on its own: a bad title does not drop the body
        let field = |name: &str| value.get(name).and_then(Value::as_str).map(str::to_string);
        Self {
            title: field("title"),
            body: field("body"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationOptions {
    pub body: String,
    pub icon: String,
    pub badge: String,
    pub dir: String,
    pub lang: String,
    pub vibrate: Vec<u32>,
    pub tag: String,
    pub renotify: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub title: String,
    pub options: NotificationOptions,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

impl Notification {
    pub fn from_payload(payload: PushPayload) -> Self {
        Self {
            title: non_empty(payload.title).unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            options: NotificationOptions {
                body: non_empty(payload.body).unwrap_or_else(|| DEFAULT_BODY.to_string()),
                icon: ICON.to_string(),
                badge: BADGE.to_string(),
                dir: "rtl".to_string(),
                lang: "ur".to_string(),
                vibrate: VIBRATE_PATTERN.to_vec(),
                tag: NOTIFICATION_TAG.to_string(),
                renotify: true,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_missing_payload() {
        assert_eq!(PushPayload::parse(None), PushPayload::default());
    }

    #[test]
    fn test_parse_full_payload() {
        let payload = PushPayload::parse(Some(br#"{"title":"Fajr","body":"Time for Fajr"}"#.as_slice()));
        assert_eq!(payload.title.as_deref(), Some("Fajr"));
        assert_eq!(payload.body.as_deref(), Some("Time for Fajr"));
    }

    #[test]
    fn test_parse_malformed_payload_is_empty() {
        assert_eq!(PushPayload::parse(Some(b"not json".as_slice())), PushPayload::default());
        assert_eq!(PushPayload::parse(Some(b"[1,2,3]".as_slice())), PushPayload::default());
        assert_eq!(PushPayload::parse(Some(b"".as_slice())), PushPayload::default());
    }

    #[test]
    fn test_parse_fields_independently() {
        let payload = PushPayload::parse(Some(br#"{"title":5,"body":"Asr"}"#.as_slice()));
        assert_eq!(payload.title, None);
        assert_eq!(payload.body.as_deref(), Some("Asr"));

        let n = Notification::from_payload(payload);
        assert_eq!(n.title, "StepToDeen");
        assert_eq!(n.options.body, "Asr");
    }

    #[test]
    fn test_parse_non_object_json_is_empty() {
        assert_eq!(PushPayload::parse(Some(br#""Fajr""#.as_slice())), PushPayload::default());
        assert_eq!(PushPayload::parse(Some(b"null".as_slice())), PushPayload::default());
    }

    #[test]
    fn test_notification_defaults() {
        let n = Notification::from_payload(PushPayload::default());
        assert_eq!(n.title, "StepToDeen");
        assert_eq!(n.options.body, "نماز کا وقت ہو گیا ہے");
        assert_eq!(n.options.icon, "./icons/icon-192.png");
        assert_eq!(n.options.badge, "./icons/icon-72.png");
        assert_eq!(n.options.dir, "rtl");
        assert_eq!(n.options.lang, "ur");
        assert_eq!(n.options.vibrate, vec![200, 100, 200]);
        assert_eq!(n.options.tag, "prayer-notification");
        assert!(n.options.renotify);
    }

    #[test]
    fn test_empty_strings_fall_back_to_defaults() {
        let n = Notification::from_payload(PushPayload {
            title: Some(String::new()),
            body: Some("Asr".to_string()),
        });
        assert_eq!(n.title, "StepToDeen");
        assert_eq!(n.options.body, "Asr");
    }
}
