/// Board seats
///
/// # Schema
///
/// ```sql
/// CREATE TYPE board_position AS ENUM ('President', 'Vice President', 'Head', 'Co-Head', 'Founder');
///
/// CREATE TABLE board (
///     board_id SERIAL PRIMARY KEY,
///     full_name VARCHAR(100) NOT NULL,
///     position board_position NOT NULL,
///     department_id INTEGER REFERENCES departments(department_id),
///     user_id INTEGER REFERENCES users(user_id) ON DELETE SET NULL,
///     year VARCHAR(9) NOT NULL
/// );
/// ```

use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// Board position, as stored in the `board_position` enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "board_position")]
pub enum BoardPosition {
    President,
    #[sqlx(rename = "Vice President")]
    #[serde(rename = "Vice President")]
    VicePresident,
    Founder,
    Head,
    #[sqlx(rename = "Co-Head")]
    #[serde(rename = "Co-Head")]
    CoHead,
}

impl BoardPosition {
    pub fn as_str(&self) -> &'static str {
        match self {
            BoardPosition::President => "President",
            BoardPosition::VicePresident => "Vice President",
            BoardPosition::Founder => "Founder",
            BoardPosition::Head => "Head",
            BoardPosition::CoHead => "Co-Head",
        }
    }

    /// Display rank; lower sorts first
    pub fn rank(&self) -> u8 {
        match self {
            BoardPosition::President => 0,
            BoardPosition::VicePresident => 1,
            BoardPosition::Founder => 2,
            BoardPosition::Head => 3,
            BoardPosition::CoHead => 4,
        }
    }
}

/// A board seat with its department name resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct BoardMember {
    pub board_id: i32,
    pub full_name: String,
    pub position: BoardPosition,
    pub department_id: Option<i32>,
    pub department_name: Option<String>,
    pub user_id: Option<i32>,

    /// Academic year of the term, e.g. `2024/2025`
    pub year: String,
}

impl BoardMember {
    /// Lists the board ordered by position rank, then name
    pub async fn list(pool: &PgPool, department_id: Option<i32>) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, BoardMember>(
            r#"
            SELECT b.board_id, b.full_name, b.position, b.department_id,
                   d.name AS department_name, b.user_id, b.year
            FROM board b
            LEFT JOIN departments d ON d.department_id = b.department_id
            WHERE ($1::INTEGER IS NULL OR b.department_id = $1)
            ORDER BY CASE b.position
                WHEN 'President' THEN 0
                WHEN 'Vice President' THEN 1
                WHEN 'Founder' THEN 2
                WHEN 'Head' THEN 3
                ELSE 4
            END, b.full_name
            "#,
        )
        .bind(department_id)
        .fetch_all(pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_serializes_with_spaces() {
        let json = serde_json::to_string(&BoardPosition::VicePresident).unwrap();
        assert_eq!(json, "\"Vice President\"");
        let parsed: BoardPosition = serde_json::from_str("\"Co-Head\"").unwrap();
        assert_eq!(parsed, BoardPosition::CoHead);
    }

    #[test]
    fn test_rank_order() {
        let mut positions = vec![
            BoardPosition::CoHead,
            BoardPosition::Head,
            BoardPosition::President,
            BoardPosition::Founder,
            BoardPosition::VicePresident,
        ];
        positions.sort_by_key(BoardPosition::rank);
        let names: Vec<_> = positions.iter().map(BoardPosition::as_str).collect();
        assert_eq!(
            names,
            ["President", "Vice President", "Founder", "Head", "Co-Head"]
        );
    }
}
