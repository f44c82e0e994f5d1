use super::*;
use crate::scheme::{self, HostExtension, SyntaxFlags};
use alloc::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

#[test]
fn state_moves_forward() {
    let uri = Uri::parse("http://h/a?b#c").unwrap();
    assert_eq!(uri.parse_state(), ParseState::MinimalParsed);
    assert_eq!(uri.scheme(), Ok("http"));
    assert_eq!(uri.parse_state(), ParseState::MinimalParsed);
    assert_eq!(uri.query(), Ok("?b"));
    assert_eq!(uri.parse_state(), ParseState::FullyParsed);

    let rel = Uri::parse_with_kind("a/b", UriKind::RelativeOrAbsolute).unwrap();
    assert_eq!(rel.parse_state(), ParseState::Unparsed);
}

#[test]
fn working_string_is_trimmed() {
    let uri = Uri::parse("  http://h/a \t\r\n").unwrap();
    assert_eq!(uri.string, "http://h/a");
    assert_eq!(uri.original_string(), "  http://h/a \t\r\n");

    let uri = Uri::parse("http://h/").unwrap();
    assert!(uri.original.is_none());
}

#[test]
fn iri_input_is_rebuilt() {
    let uri = Uri::parse("http://h/ü?ä").unwrap();
    assert_eq!(uri.original_string(), "http://h/ü?ä");
    assert!(uri.flags.any(Flags::HAS_UNICODE));
    assert_eq!(uri.absolute_path(), Ok("/%C3%BC"));
    assert_eq!(uri.query(), Ok("?%C3%A4"));
}

#[test]
fn caches_are_stable() {
    let uri = Uri::parse("http://H/a/../b").unwrap();
    let first = uri.absolute_uri().unwrap() as *const str;
    let second = uri.absolute_uri().unwrap() as *const str;
    assert_eq!(first, second);

    let copy = uri.clone();
    assert_eq!(copy.absolute_uri(), Ok("http://h/b"));
}

#[test]
fn left_part_of_dos_path_has_no_authority() {
    let uri = Uri::parse("file:///c:/dir/x").unwrap();
    assert_eq!(uri.get_left_part(UriPartial::Authority), Ok(String::new()));
    assert_eq!(uri.get_left_part(UriPartial::Scheme), Ok("file://".into()));
}

struct Fixed(&'static str);

impl HostExtension for Fixed {
    fn host(&self, _: &RawComponents<'_>) -> Option<String> {
        Some(self.0.into())
    }
}

#[test]
fn extension_answers_are_validated() {
    let flags = SyntaxFlags::MUST_HAVE_AUTHORITY
        | SyntaxFlags::MAY_HAVE_PATH
        | SyntaxFlags::ALLOW_INTERNET_HOST
        | SyntaxFlags::PATH_IS_ROOTED;
    let syntax = SchemeSyntax::new(None, flags).with_extension(Arc::new(Fixed("Other.Example")));
    scheme::register("x-unit-fixed", syntax).unwrap();
    let uri = Uri::parse("x-unit-fixed://h/p").unwrap();
    assert_eq!(uri.host(), Ok("other.example"));
    assert_eq!(uri.host_name_type(), Ok(HostNameType::Dns));

    let syntax = SchemeSyntax::new(None, flags).with_extension(Arc::new(Fixed("not a host")));
    scheme::register("x-unit-junk", syntax).unwrap();
    let uri = Uri::parse("x-unit-junk://h/p").unwrap();
    assert_eq!(uri.host_name_type(), Ok(HostNameType::Basic));
}

static REENTRANT_CALLS: AtomicUsize = AtomicUsize::new(0);

thread_local! {
    static CURRENT: RefCell<Option<Uri>> = RefCell::new(None);
}

/// Asks for the host of the instance it is building the host of.
struct Reentrant;

impl HostExtension for Reentrant {
    fn host(&self, raw: &RawComponents<'_>) -> Option<String> {
        REENTRANT_CALLS.fetch_add(1, Ordering::SeqCst);
        let inner = CURRENT.with(|cur| {
            cur.borrow()
                .as_ref()
                .map(|uri| uri.host_name_type().unwrap())
        });
        assert_eq!(inner, Some(HostNameType::Basic));
        Some(raw.host.into())
    }
}

#[test]
fn reentrant_extension_fails_closed() {
    let flags = SyntaxFlags::MUST_HAVE_AUTHORITY
        | SyntaxFlags::MAY_HAVE_PATH
        | SyntaxFlags::ALLOW_INTERNET_HOST;
    let syntax = SchemeSyntax::new(None, flags).with_extension(Arc::new(Reentrant));
    scheme::register("x-unit-reentrant", syntax).unwrap();

    let uri = Uri::parse("x-unit-reentrant://h/p").unwrap();
    CURRENT.with(|cur| *cur.borrow_mut() = Some(uri.clone()));
    // The extension builds the host of the clone, which calls the
    // extension again; that innermost call sees a basic host.
    assert_eq!(uri.host(), Ok("h"));
    assert_eq!(REENTRANT_CALLS.load(Ordering::SeqCst), 2);

    // The clone keeps the basic host published by the nested call.
    let clone = CURRENT.with(|cur| cur.borrow_mut().take()).unwrap();
    assert_eq!(clone.host_name_type(), Ok(HostNameType::Basic));
    assert_eq!(uri.host_name_type(), Ok(HostNameType::Dns));
    assert_eq!(REENTRANT_CALLS.load(Ordering::SeqCst), 2);
}
