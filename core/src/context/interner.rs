use lasso::{Spur, ThreadedRodeo};
use std::sync::OnceLock;

/// Interned name key. Attacker, defender and spell names recur millions of
/// times per log, so records carry 4-byte keys instead of owned strings.
pub type IStr = Spur;

static INTERNER: OnceLock<ThreadedRodeo> = OnceLock::new();
static EMPTY_ISTR: OnceLock<Spur> = OnceLock::new();

/// Get the global interner (initializes on first call).
pub fn interner() -> &'static ThreadedRodeo {
    INTERNER.get_or_init(ThreadedRodeo::default)
}

pub fn intern(s: &str) -> IStr {
    interner().get_or_intern(s)
}

/// Intern the uppercased form of `s`. Damage participants are keyed this way
/// so "Kazint", "kazint" and "KAZINT" collapse to one entity.
pub fn intern_upper(s: &str) -> IStr {
    if s.bytes().any(|b| b.is_ascii_lowercase()) || !s.is_ascii() {
        intern(&s.to_uppercase())
    } else {
        intern(s)
    }
}

/// Returns the IStr for an empty string. Use this instead of IStr::default()
/// since Spur::default() collides with the first interned string.
#[inline]
pub fn empty_istr() -> IStr {
    *EMPTY_ISTR.get_or_init(|| interner().get_or_intern(""))
}

pub fn resolve(key: IStr) -> &'static str {
    interner().resolve(&key)
}
