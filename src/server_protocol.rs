use serde_json::{json, Value};

use crate::types::{Direction, GameConfig, RankingEntry, Snapshot};

#[derive(Debug, PartialEq)]
pub enum ParsedClientMessage {
    Hello { name: String },
    Start,
    Input { dir: Direction },
    Pause { paused: Option<bool> },
    Restart,
    Ranking { limit: Option<usize> },
    Ping { t: f64 },
}

pub fn parse_client_message(raw: &str) -> Option<ParsedClientMessage> {
    let value: Value = serde_json::from_str(raw).ok()?;
    let object = value.as_object()?;
    let message_type = object.get("type")?.as_str()?;

    match message_type {
        "hello" => {
            let name = object.get("name")?.as_str()?.to_string();
            Some(ParsedClientMessage::Hello { name })
        }
        "start" => Some(ParsedClientMessage::Start),
        "input" => {
            let dir = Direction::parse_move(object.get("dir")?.as_str()?)?;
            Some(ParsedClientMessage::Input { dir })
        }
        "pause" => {
            let paused = match object.get("paused") {
                None => None,
                Some(value) => Some(value.as_bool()?),
            };
            Some(ParsedClientMessage::Pause { paused })
        }
        "restart" => Some(ParsedClientMessage::Restart),
        "ranking" => {
            let limit = match object.get("limit") {
                None => None,
                Some(value) => Some(usize::try_from(value.as_u64()?).ok()?),
            };
            Some(ParsedClientMessage::Ranking { limit })
        }
        "ping" => {
            let t = object.get("t")?.as_f64()?;
            if !t.is_finite() {
                return None;
            }
            Some(ParsedClientMessage::Ping { t })
        }
        _ => None,
    }
}

pub fn welcome_message(name: &str, seed: u32, config: &GameConfig) -> Value {
    json!({
        "type": "welcome",
        "name": name,
        "seed": seed,
        "config": config,
    })
}

pub fn state_message(snapshot: &Snapshot) -> Value {
    json!({
        "type": "state",
        "snapshot": snapshot,
    })
}

pub fn ranking_message(entries: &[RankingEntry]) -> Value {
    json!({
        "type": "ranking",
        "entries": entries,
    })
}

pub fn ranking_error_message(message: &str) -> Value {
    json!({
        "type": "ranking_error",
        "message": message,
    })
}

pub fn score_saved_message(entry: &RankingEntry) -> Value {
    json!({
        "type": "score_saved",
        "entry": entry,
    })
}

pub fn pong_message(t: f64) -> Value {
    json!({
        "type": "pong",
        "t": t,
    })
}

pub fn error_message(message: &str) -> Value {
    json!({
        "type": "error",
        "message": message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_hello_message() {
        let parsed = parse_client_message(r#"{"type":"hello","name":"A"}"#)
            .expect("hello message should parse");
        assert_eq!(
            parsed,
            ParsedClientMessage::Hello {
                name: "A".to_string()
            }
        );
        assert!(parse_client_message(r#"{"type":"hello"}"#).is_none());
    }

    #[test]
    fn parse_lifecycle_messages() {
        assert_eq!(
            parse_client_message(r#"{"type":"start"}"#),
            Some(ParsedClientMessage::Start)
        );
        assert_eq!(
            parse_client_message(r#"{"type":"restart"}"#),
            Some(ParsedClientMessage::Restart)
        );
        assert_eq!(
            parse_client_message(r#"{"type":"pause","paused":true}"#),
            Some(ParsedClientMessage::Pause { paused: Some(true) })
        );
        assert_eq!(
            parse_client_message(r#"{"type":"pause"}"#),
            Some(ParsedClientMessage::Pause { paused: None })
        );
        assert!(parse_client_message(r#"{"type":"pause","paused":"yes"}"#).is_none());
    }

    #[test]
    fn parse_input_rejects_invalid_direction() {
        assert!(parse_client_message(r#"{"type":"input","dir":"invalid"}"#).is_none());
        assert!(parse_client_message(r#"{"type":"input"}"#).is_none());
        assert_eq!(
            parse_client_message(r#"{"type":"input","dir":"left"}"#),
            Some(ParsedClientMessage::Input {
                dir: Direction::Left
            })
        );
    }

    #[test]
    fn parse_ranking_limit_must_be_unsigned() {
        assert_eq!(
            parse_client_message(r#"{"type":"ranking","limit":5}"#),
            Some(ParsedClientMessage::Ranking { limit: Some(5) })
        );
        assert_eq!(
            parse_client_message(r#"{"type":"ranking"}"#),
            Some(ParsedClientMessage::Ranking { limit: None })
        );
        assert!(parse_client_message(r#"{"type":"ranking","limit":-3}"#).is_none());
    }

    #[test]
    fn parse_ping_requires_number() {
        assert!(matches!(
            parse_client_message(r#"{"type":"ping","t":12.5}"#),
            Some(ParsedClientMessage::Ping { .. })
        ));
        assert!(parse_client_message(r#"{"type":"ping","t":"now"}"#).is_none());
    }

    #[test]
    fn unknown_or_malformed_messages_are_rejected() {
        assert!(parse_client_message("not json").is_none());
        assert!(parse_client_message(r#"["start"]"#).is_none());
        assert!(parse_client_message(r#"{"type":"lobby_start"}"#).is_none());
    }

    #[test]
    fn server_messages_carry_their_type_tag() {
        let entry = RankingEntry {
            name: "AA".to_string(),
            score: 10,
            level: 1,
            date: "2024-01-01T00:00:00.000Z".to_string(),
        };
        assert_eq!(pong_message(3.0)["type"], "pong");
        assert_eq!(error_message("bad")["message"], "bad");
        assert_eq!(ranking_error_message("down")["type"], "ranking_error");
        assert_eq!(score_saved_message(&entry)["entry"]["name"], "AA");
        assert_eq!(ranking_message(&[entry])["entries"][0]["score"], 10);
    }
}
