//! Common test utilities

use boardflow_core::BoardSnapshot;
use serde_json::{json, Value};

pub fn shape(id: &str, shape: &str, content: &str) -> Value {
    json!({
        "id": id,
        "type": "shape",
        "data": {"content": content, "shape": shape},
        "position": {"x": 0.0, "y": 0.0}
    })
}

pub fn empty_shape(id: &str) -> Value {
    json!({"id": id, "type": "shape", "data": {"shape": "round_rectangle"}})
}

pub fn text(id: &str, content: &str) -> Value {
    json!({"id": id, "type": "text", "data": {"content": content}})
}

pub fn connector(from: &str, to: &str, captions: &[&str]) -> Value {
    let captions: Vec<Value> = captions.iter().map(|c| json!({"content": c})).collect();
    json!({
        "startItem": {"id": from},
        "endItem": {"id": to},
        "captions": captions
    })
}

pub fn snapshot(items: Vec<Value>, connectors: Vec<Value>) -> BoardSnapshot {
    BoardSnapshot {
        items,
        connectors,
        board_id: Some("uXjVtest=".into()),
    }
}
