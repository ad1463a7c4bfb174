use axum_extra::extract::cookie::{Cookie, SignedCookieJar};
use serde::{Deserialize, Serialize};

const FLASH_COOKIE: &str = "flash";

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Success,
    Danger,
}

/// One-shot message carried across a redirect in a signed cookie and
/// consumed by the next rendered page.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Flash {
    pub level: Level,
    pub message: String,
}

pub fn success(jar: SignedCookieJar, message: impl Into<String>) -> SignedCookieJar {
    set(jar, Flash { level: Level::Success, message: message.into() })
}

pub fn danger(jar: SignedCookieJar, message: impl Into<String>) -> SignedCookieJar {
    set(jar, Flash { level: Level::Danger, message: message.into() })
}

fn set(jar: SignedCookieJar, flash: Flash) -> SignedCookieJar {
    let Ok(value) = serde_json::to_string(&flash) else {
        return jar;
    };
    jar.add(Cookie::build((FLASH_COOKIE, value)).path("/").http_only(true))
}

/// Pop the pending flash, if any. The cookie is removed so the message
/// shows exactly once.
pub fn take(jar: SignedCookieJar) -> (SignedCookieJar, Option<Flash>) {
    let Some(cookie) = jar.get(FLASH_COOKIE) else {
        return (jar, None);
    };
    let flash = serde_json::from_str(cookie.value()).ok();
    (jar.remove(Cookie::build(FLASH_COOKIE).path("/")), flash)
}

#[cfg(test)]
mod tests {
    use axum_extra::extract::cookie::Key;

    use super::*;

    #[test]
    fn set_then_take_returns_message_once() {
        let jar = SignedCookieJar::new(Key::generate());
        let jar = success(jar, "Movie added successfully!");

        let (jar, flash) = take(jar);
        let flash = flash.unwrap();
        assert_eq!(flash.level, Level::Success);
        assert_eq!(flash.message, "Movie added successfully!");

        let (_, again) = take(jar);
        assert!(again.is_none());
    }

    #[test]
    fn take_without_flash_is_none() {
        let jar = SignedCookieJar::new(Key::generate());
        let (_, flash) = take(jar);
        assert!(flash.is_none());
    }
}
