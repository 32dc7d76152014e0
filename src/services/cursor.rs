/// Keyset cursors
///
/// One struct per pagination mode, so the ordering semantics stay
/// explicit per mode instead of hiding behind one generic cursor. The
/// wire form is an opaque base64 token carrying the boundary values
/// themselves — no cursor-row lookup is ever needed, so a cursor
/// pointing at a since-deleted item still paginates correctly.
use crate::error::{AppError, Result};
use base64::{engine::general_purpose, Engine as _};

/// Recency feed boundary: the last-seen item id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecencyCursor {
    pub id: i64,
}

/// Trending feed boundary: (score, id) of the last row
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankCursor {
    pub score: f64,
    pub id: i64,
}

/// Historical-window boundary: (likes, id) of the last row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikesCursor {
    pub likes: i64,
    pub id: i64,
}

fn encode(payload: String) -> String {
    general_purpose::STANDARD.encode(payload)
}

fn decode(token: &str) -> Result<String> {
    let bytes = general_purpose::STANDARD
        .decode(token)
        .map_err(|_| AppError::BadRequest("Invalid cursor format".to_string()))?;
    String::from_utf8(bytes).map_err(|_| AppError::BadRequest("Invalid cursor encoding".to_string()))
}

fn split_pair(payload: &str) -> Result<(&str, &str)> {
    payload
        .split_once(':')
        .ok_or_else(|| AppError::BadRequest("Invalid cursor value".to_string()))
}

impl RecencyCursor {
    pub fn encode(&self) -> String {
        encode(self.id.to_string())
    }

    pub fn decode(token: &str) -> Result<Self> {
        let payload = decode(token)?;
        let id = payload
            .parse::<i64>()
            .map_err(|_| AppError::BadRequest("Invalid cursor value".to_string()))?;
        Ok(RecencyCursor { id })
    }
}

impl RankCursor {
    pub fn encode(&self) -> String {
        encode(format!("{}:{}", self.score, self.id))
    }

    pub fn decode(token: &str) -> Result<Self> {
        let payload = decode(token)?;
        let (score, id) = split_pair(&payload)?;
        let score = score
            .parse::<f64>()
            .ok()
            .filter(|s| s.is_finite())
            .ok_or_else(|| AppError::BadRequest("Invalid cursor value".to_string()))?;
        let id = id
            .parse::<i64>()
            .map_err(|_| AppError::BadRequest("Invalid cursor value".to_string()))?;
        Ok(RankCursor { score, id })
    }
}

impl LikesCursor {
    pub fn encode(&self) -> String {
        encode(format!("{}:{}", self.likes, self.id))
    }

    pub fn decode(token: &str) -> Result<Self> {
        let payload = decode(token)?;
        let (likes, id) = split_pair(&payload)?;
        let likes = likes
            .parse::<i64>()
            .map_err(|_| AppError::BadRequest("Invalid cursor value".to_string()))?;
        let id = id
            .parse::<i64>()
            .map_err(|_| AppError::BadRequest("Invalid cursor value".to_string()))?;
        Ok(LikesCursor { likes, id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recency_round_trip() {
        let cursor = RecencyCursor { id: 42 };
        assert_eq!(RecencyCursor::decode(&cursor.encode()).unwrap(), cursor);
    }

    #[test]
    fn rank_round_trip_preserves_score_exactly() {
        let cursor = RankCursor {
            score: 0.037_210_417,
            id: 9_001,
        };
        let decoded = RankCursor::decode(&cursor.encode()).unwrap();
        assert_eq!(decoded.score, cursor.score);
        assert_eq!(decoded.id, cursor.id);
    }

    #[test]
    fn likes_round_trip() {
        let cursor = LikesCursor { likes: 17, id: 3 };
        assert_eq!(LikesCursor::decode(&cursor.encode()).unwrap(), cursor);
    }

    #[test]
    fn garbage_tokens_are_rejected() {
        assert!(RecencyCursor::decode("not-base64!").is_err());
        assert!(RankCursor::decode(&general_purpose::STANDARD.encode("no-separator")).is_err());
        assert!(LikesCursor::decode(&general_purpose::STANDARD.encode("a:b")).is_err());
        assert!(RankCursor::decode(&general_purpose::STANDARD.encode("NaN:5")).is_err());
    }

    #[test]
    fn cursor_from_one_mode_does_not_decode_in_another() {
        let recency = RecencyCursor { id: 7 }.encode();
        assert!(RankCursor::decode(&recency).is_err());
    }
}
