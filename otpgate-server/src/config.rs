//! Runtime settings shared by request handlers.

/// Name of the response line that echoes the submitted token.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TokenField {
    /// `otp=`, matching the request parameter.
    #[default]
    Otp,
    /// `opt=`, as emitted by earlier deployments. Clients that verify the
    /// signature over the exact field names need this spelling.
    Legacy,
}

impl TokenField {
    pub const fn as_str(&self) -> &'static str {
        match self {
            TokenField::Otp => "otp",
            TokenField::Legacy => "opt",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ServerConfig {
    pub token_field: TokenField,
}

impl ServerConfig {
    pub fn with_legacy_token_field(legacy: bool) -> Self {
        Self {
            token_field: if legacy { TokenField::Legacy } else { TokenField::Otp },
        }
    }
}
