//! Application Error - Unified error type at the service boundary
//!
//! Domain crates keep their own `thiserror` enums and convert into
//! [`AppError`] when an error leaves the core. [`AppError::body`] is the
//! only representation that should reach a caller.

use std::borrow::Cow;
use std::error::Error;
use std::fmt;

use serde::Serialize;

use super::kind::ErrorKind;

/// 技術的エラーの際に呼び出し側へ返す固定メッセージ
const TECHNICAL_ERROR_MESSAGE: &str = "An internal error occurred";

type Text = Cow<'static, str>;
type BoxedSource = Box<dyn Error + Send + Sync + 'static>;

/// アプリケーション統一エラー型
///
/// 分類 (`kind`)、人間向けメッセージ、任意のアクション、任意の元エラーを持ちます。
/// 元エラーはログ専用で、[`ErrorBody`] には含まれません。
///
/// ## Examples
/// ```rust
/// use kernel::error::{app_error::AppError, kind::ErrorKind};
///
/// let err = AppError::new(ErrorKind::NotFound, "Course not found");
/// assert_eq!(err.code(), "NOT_FOUND");
///
/// let err = AppError::conflict("Reset token is expired or already used")
///     .with_action("Request a new password reset");
/// assert_eq!(err.action(), Some("Request a new password reset"));
/// ```
pub struct AppError {
    kind: ErrorKind,
    message: Text,
    action: Option<Text>,
    source: Option<BoxedSource>,
}

/// アプリケーション結果型エイリアス
pub type AppResult<T> = Result<T, AppError>;

/// 呼び出し側に返すエラー表現
///
/// `message` はサーバー側エラーでは固定文言に置き換えられます。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody<'a> {
    pub code: &'static str,
    pub message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<&'a str>,
}

impl AppError {
    pub fn new(kind: ErrorKind, message: impl Into<Text>) -> Self {
        Self {
            kind,
            message: message.into(),
            action: None,
            source: None,
        }
    }

    /// 409 状態の競合
    pub fn conflict(message: impl Into<Text>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    /// 500 技術的エラー
    pub fn internal(message: impl Into<Text>) -> Self {
        Self::new(ErrorKind::InternalServerError, message)
    }

    /// ユーザー向けアクションを設定
    pub fn with_action(mut self, action: impl Into<Text>) -> Self {
        self.action = Some(action.into());
        self
    }

    /// 元のエラーを設定（ログ用）
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    #[inline]
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    #[inline]
    pub fn status_code(&self) -> u16 {
        self.kind.status_code()
    }

    /// 内部メッセージ（ログ用）
    pub fn message(&self) -> &str {
        &self.message
    }

    /// 呼び出し側に公開してよいメッセージ
    ///
    /// サーバー側エラーではストレージ等の詳細を隠します。
    pub fn public_message(&self) -> &str {
        match self.kind.is_server_error() {
            true => TECHNICAL_ERROR_MESSAGE,
            false => &self.message,
        }
    }

    pub fn action(&self) -> Option<&str> {
        self.action.as_deref()
    }

    pub fn is_server_error(&self) -> bool {
        self.kind.is_server_error()
    }

    /// 公開用の表現を作成
    pub fn body(&self) -> ErrorBody<'_> {
        ErrorBody {
            code: self.code(),
            message: self.public_message(),
            action: self.action(),
        }
    }
}

impl fmt::Debug for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppError")
            .field("kind", &self.kind)
            .field("message", &self.message)
            .field("action", &self.action)
            .field("source", &self.source)
            .finish()
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.action {
            Some(action) => write!(f, "{}: {} ({action})", self.code(), self.message),
            None => write!(f, "{}: {}", self.code(), self.message),
        }
    }
}

impl Error for AppError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source.as_deref().map(|e| e as &(dyn Error + 'static))
    }
}
