use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::encode::IsNull;
use sqlx::error::BoxDynError;
use sqlx::postgres::{PgArgumentBuffer, PgTypeInfo, PgValueRef};
use sqlx::{Decode, Encode, FromRow, Postgres, Type};

/// How a lesson's content token is interpreted: TEXT stores the literal text
/// inline, the file types store a reference into the content store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LessonType {
    Text,
    Video,
    Image,
    Pdf,
}

impl LessonType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LessonType::Text => "TEXT",
            LessonType::Video => "VIDEO",
            LessonType::Image => "IMAGE",
            LessonType::Pdf => "PDF",
        }
    }

    /// Fixed content-type label for file-backed lessons. This is a pure
    /// function of the lesson type and never sniffs the stored bytes.
    pub fn file_content_type(&self) -> &'static str {
        match self {
            LessonType::Video => "video/mp4",
            LessonType::Image => "image/jpeg",
            LessonType::Pdf => "application/pdf",
            _ => "application/octet-stream",
        }
    }
}

impl fmt::Display for LessonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LessonType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "TEXT" => Ok(LessonType::Text),
            "VIDEO" => Ok(LessonType::Video),
            "IMAGE" => Ok(LessonType::Image),
            "PDF" => Ok(LessonType::Pdf),
            other => Err(format!("unknown lesson type: {}", other)),
        }
    }
}

// Stored as a plain TEXT column; delegate to the string codecs rather than
// declaring a Postgres enum type.
impl Type<Postgres> for LessonType {
    fn type_info() -> PgTypeInfo {
        <&str as Type<Postgres>>::type_info()
    }

    fn compatible(ty: &PgTypeInfo) -> bool {
        <&str as Type<Postgres>>::compatible(ty)
    }
}

impl<'r> Decode<'r, Postgres> for LessonType {
    fn decode(value: PgValueRef<'r>) -> Result<Self, BoxDynError> {
        let s = <&str as Decode<Postgres>>::decode(value)?;
        s.parse::<LessonType>().map_err(Into::into)
    }
}

impl<'q> Encode<'q, Postgres> for LessonType {
    fn encode_by_ref(&self, buf: &mut PgArgumentBuffer) -> IsNull {
        <&str as Encode<Postgres>>::encode(self.as_str(), buf)
    }
}

/// Lesson row. `content` is the content token: literal text for TEXT lessons,
/// a stored-file name for VIDEO/IMAGE/PDF lessons. Never empty.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    pub id: i64,
    pub module_id: i64,
    pub title: String,
    #[serde(rename = "type")]
    pub lesson_type: LessonType,
    pub content: String,
}

/// Fields of a lesson-creation request, assembled from the multipart form.
#[derive(Debug, Clone)]
pub struct NewLesson {
    pub title: String,
    pub lesson_type: LessonType,
    pub content: Option<String>,
}
