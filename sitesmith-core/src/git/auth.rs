//! Token authentication for GitHub remotes

use git2::{Cred, CredentialType, RemoteCallbacks};
use url::Url;

const GITHUB_SSH_PREFIX: &str = "git@github.com:";
const GITHUB_HTTPS_PREFIX: &str = "https://github.com/";

/// Password paired with a token supplied as the HTTPS username
const TOKEN_PASSWORD: &str = "x-oauth-basic";

/// An opaque access token
///
/// The token never shows up in `Debug` output; call [`Credential::expose`]
/// where the raw value is genuinely needed.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wrap a raw token
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// Rewrite a remote URL so that it carries `credential`
///
/// - no credential: the URL is returned as-is
/// - `git@github.com:owner/repo.git` becomes `https://github.com/owner/repo.git`
///   before the token is inserted
/// - `https://github.com/...` becomes `https://{token}@github.com/...`
/// - anything else passes through untouched
pub fn rewrite_with_credential(url: &str, credential: Option<&Credential>) -> String {
    let Some(credential) = credential else {
        return url.to_string();
    };

    let https = match url.strip_prefix(GITHUB_SSH_PREFIX) {
        Some(path) => format!("{}{}", GITHUB_HTTPS_PREFIX, path),
        None => url.to_string(),
    };

    if !https.starts_with(GITHUB_HTTPS_PREFIX) {
        return https;
    }

    // Url::set_username percent-encodes anything that would break the authority
    if let Ok(mut parsed) = Url::parse(&https) {
        if parsed.set_username(credential.expose()).is_ok() {
            return parsed.into();
        }
    }

    https.replacen(
        GITHUB_HTTPS_PREFIX,
        &format!("https://{}@github.com/", credential.expose()),
        1,
    )
}

/// Strip userinfo from a URL so it can be logged or reported
pub fn redact_url(url: &str) -> String {
    match Url::parse(url) {
        Ok(mut parsed) if !parsed.username().is_empty() || parsed.password().is_some() => {
            let _ = parsed.set_password(None);
            if parsed.set_username("***").is_err() {
                return "<redacted url>".to_string();
            }
            parsed.into()
        }
        _ => url.to_string(),
    }
}

/// Remote callbacks that answer credential requests for network operations
///
/// HTTPS remotes get the token (or the username embedded in the URL) as
/// plaintext credentials; SSH remotes go through the local agent.
pub fn remote_callbacks(credential: Option<&Credential>) -> RemoteCallbacks<'_> {
    let mut callbacks = RemoteCallbacks::new();
    callbacks.credentials(move |_url, username_from_url, allowed| {
        if allowed.contains(CredentialType::USER_PASS_PLAINTEXT) {
            if let Some(credential) = credential {
                let user = username_from_url.unwrap_or(credential.expose());
                return Cred::userpass_plaintext(user, TOKEN_PASSWORD);
            }
        }

        if allowed.contains(CredentialType::SSH_KEY) {
            return Cred::ssh_key_from_agent(username_from_url.unwrap_or("git"));
        }

        Cred::default()
    });
    callbacks
}
