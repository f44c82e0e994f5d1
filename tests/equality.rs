use compat_uri::{Uri, UriKind};
use std::{
    collections::{hash_map::DefaultHasher, HashSet},
    hash::{Hash, Hasher},
};

fn uri(s: &str) -> Uri {
    Uri::parse_with_kind(s, UriKind::RelativeOrAbsolute).unwrap()
}

fn hash(u: &Uri) -> u64 {
    let mut h = DefaultHasher::new();
    u.hash(&mut h);
    h.finish()
}

#[track_caller]
fn same(a: &str, b: &str) {
    let (a, b) = (uri(a), uri(b));
    assert_eq!(a, b);
    assert_eq!(b, a);
    assert_eq!(hash(&a), hash(&b));
}

#[track_caller]
fn differ(a: &str, b: &str) {
    let (a, b) = (uri(a), uri(b));
    assert_ne!(a, b);
    assert_ne!(b, a);
}

#[test]
fn absolute() {
    same("http://h/a", "http://h/a");
    same("HTTP://H:80/a", "http://h/a");
    same("http://h", "http://h/");
    same("http://h/a/./b/../c", "http://h/a/c");
    same("http://h/a#x", "http://h/a#y");
    same("http://u@h/a", "http://v@h/a");
    same("http://127.0.0.1/", "http://0x7f.1/");
    same("http://[0:0::1]/", "http://[::1]/");

    differ("http://h/a", "http://h/A");
    differ("http://h/a", "https://h/a");
    differ("http://h/a", "http://h:81/a");
    differ("http://h/a", "http://g/a");
    differ("http://h/a?x", "http://h/a?y");
}

#[test]
fn mailto_compares_userinfo() {
    same("mailto:a@h", "mailto:a@h");
    differ("mailto:a@h", "mailto:b@h");
}

#[test]
fn file_paths_ignore_case() {
    same("file:///c:/Dir/X.txt", "file:///C:/dir/x.txt");
    same(r"c:\Dir\X.txt", r"C:\dir\x.txt");
    same(r"\\Server\Share\F", r"\\server\share\f");
    same(r"c:\dir\x", "file:///c:/dir/x");
}

#[test]
fn relative() {
    same("a/b", "a/b");
    differ("a/b", "a/B");
    differ("a/b", "http://h/a/b");
}

#[test]
fn hash_set() {
    let set: HashSet<Uri> = ["http://h/a", "HTTP://h:80/a#f", "http://h/b", "a/b", "a/b"]
        .into_iter()
        .map(uri)
        .collect();
    assert_eq!(set.len(), 3);
}

#[track_caller]
fn same_as_reparsed(s: &str) {
    let u = uri(s);
    let v = uri(u.absolute_uri().unwrap());
    assert_eq!(u, v, "{s:?} reparsed from {:?}", u.absolute_uri());
    assert_eq!(hash(&u), hash(&v));
}

#[test]
fn backslash_matches_its_escape() {
    same_as_reparsed(r"news:\");
    same_as_reparsed(r"ldap://h/a\b");
    same(r"news:a\b", "news:a%5Cb");
    differ(r"news:a\b", "news:a/b");
}

#[test]
fn dos_path_percent_is_literal() {
    same_as_reparsed(r"c:\a%41");
    same_as_reparsed(r"c:\100%");
    differ(r"c:\a%41", "file:///c:/aA");
}

#[cfg(not(windows))]
#[test]
fn unix_path_percent_is_literal() {
    same_as_reparsed("/%");
    same_as_reparsed("/a%zz");
    same_as_reparsed("/a%41");
    same("/%", "file:///%25");
    differ("/a%41", "file:///aA");
}
