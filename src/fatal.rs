//! Единая точка для фатальных ошибок формата.
//!
//! Повреждённый или чужой blob нельзя разбирать дальше: логируем и паникуем.
//! Release-профиль собирается с `panic = "abort"`, так что паника завершает процесс
//! из любого потока. Встраивающий код не должен ловить эти паники (catch_unwind)
//! и продолжать работу с тем же blob'ом: его состояние не определено.

use log::error;

#[cold]
#[track_caller]
pub fn fatal(msg: impl std::fmt::Display) -> ! {
    error!("snapshot blob fatal: {}", msg);
    panic!("snapshot blob fatal: {}", msg);
}

/// Развернуть Result из нижнего слоя или упасть.
#[track_caller]
pub fn or_fatal<T>(r: anyhow::Result<T>) -> T {
    match r {
        Ok(v) => v,
        Err(e) => fatal(format!("{:#}", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
        payload
            .downcast_ref::<String>()
            .cloned()
            .or_else(|| payload.downcast_ref::<&str>().map(|s| s.to_string()))
            .unwrap_or_default()
    }

    #[test]
    fn or_fatal_passes_ok_through() {
        assert_eq!(or_fatal(Ok::<_, anyhow::Error>(7)), 7);
    }

    #[test]
    fn or_fatal_carries_the_whole_error_chain() {
        let r = std::panic::catch_unwind(|| {
            or_fatal::<()>(Err(anyhow!("inner cause").context("outer context")))
        });
        let msg = panic_message(r.unwrap_err());
        assert!(msg.starts_with("snapshot blob fatal: "), "{}", msg);
        assert!(msg.contains("outer context: inner cause"), "{}", msg);
    }

    #[test]
    fn release_builds_abort_on_fatal() {
        let manifest = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/Cargo.toml"));
        let release = manifest
            .split("[profile.release]")
            .nth(1)
            .expect("release profile present");
        let section = release.split("\n[").next().unwrap_or("");
        assert!(section.contains("panic = \"abort\""), "{}", section);
    }
}
