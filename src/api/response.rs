// Decoding of `POST /v2/game_system/{id}/roll` responses
// Upstream payloads are untrusted: anything off-shape decodes to `None`.

use serde::Deserialize;

use crate::models::roll::{DieKind, DieResult, RollResult};

#[derive(Debug, Deserialize)]
struct RawRollResponse {
    ok: Option<bool>,
    text: Option<String>,
    secret: Option<bool>,
    success: Option<bool>,
    failure: Option<bool>,
    critical: Option<bool>,
    fumble: Option<bool>,
    rands: Option<Vec<RawDie>>,
}

#[derive(Debug, Deserialize)]
struct RawDie {
    kind: String,
    sides: i32,
    value: i32,
}

impl From<RawDie> for DieResult {
    fn from(raw: RawDie) -> Self {
        DieResult {
            kind: DieKind::from_kind(&raw.kind),
            sides: raw.sides,
            value: raw.value,
        }
    }
}

/// Decode a raw response body
pub fn decode_roll(body: &str) -> Option<RollResult> {
    serde_json::from_str::<RawRollResponse>(body)
        .ok()
        .and_then(validate)
}

fn validate(raw: RawRollResponse) -> Option<RollResult> {
    if !raw.ok? {
        return None;
    }
    let text = raw.text?;
    let secret = raw.secret?;
    let success = raw.success?;
    let failure = raw.failure?;
    let critical = raw.critical?;
    let fumble = raw.fumble?;
    let rands = raw.rands?;

    if rands.is_empty() {
        return None;
    }

    // Exactly one of the two shapes may hold
    let accepted = if success {
        !failure && !fumble
    } else {
        !critical
    };
    if !accepted {
        return None;
    }

    Some(RollResult {
        text,
        is_secret: secret,
        is_success: success,
        is_decisive: critical || fumble,
        dice: rands.into_iter().map(DieResult::from).collect(),
    })
}
