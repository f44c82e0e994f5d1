//! Dot-segment removal.

use crate::scheme::{SchemeSyntax, SyntaxFlags};
use alloc::string::String;

/// Removes dot segments from `buf[start..]` in place.
///
/// The path is scanned right to left. `/./` and a trailing `/.` are
/// dropped; `/../` and a trailing `/..` are dropped together with the
/// segment before them. Segments of three or more dots, and dots that are
/// not bounded by slashes, are left alone unless the scheme canonicalizes
/// its paths like a file system. Runs of slashes are preserved.
pub(crate) fn compress(buf: &mut String, start: usize, syntax: &SchemeSyntax) {
    if syntax.has(SyntaxFlags::CONVERT_PATH_SLASHES) && buf[start..].contains('\\') {
        let tail = buf[start..].replace('\\', "/");
        buf.truncate(start);
        buf.push_str(&tail);
    }
    let as_file_path = syntax.has(SyntaxFlags::CANONICALIZE_AS_FILE_PATH);

    let mut slash_count = 0;
    let mut last_slash = 0;
    let mut dot_count = 0;
    let mut remove_segments = 0;

    let mut i = buf.len() - start;
    while i > 0 {
        i -= 1;
        let len = buf.len() - start;
        let ch = buf.as_bytes()[start + i];

        if ch == b'/' {
            slash_count += 1;
        } else {
            if slash_count > 1 {
                last_slash = i + 1;
            }
            slash_count = 0;
        }

        if ch == b'.' {
            dot_count += 1;
            continue;
        }

        if dot_count != 0 {
            let skip_segment = !as_file_path && (dot_count > 2 || ch != b'/');
            let bounded = last_slash == i + dot_count + 1
                || (last_slash == 0 && i + dot_count + 1 == len);

            if !skip_segment && ch == b'/' && bounded && dot_count <= 2 {
                // `/./`, `/.`, `/../` or `/..`
                last_slash = i + 1 + dot_count + usize::from(last_slash != 0);
                buf.replace_range(start + i + 1..start + last_slash, "");
                last_slash = i;
                if dot_count == 2 {
                    remove_segments += 1;
                }
                dot_count = 0;
                continue;
            }
            dot_count = 0;
        }

        if ch == b'/' {
            if remove_segments != 0 {
                remove_segments -= 1;
                buf.replace_range(start + i + 1..start + last_slash + 1, "");
            }
            last_slash = i;
        }
    }

    let len = buf.len() - start;
    if len == 0 || !as_file_path || slash_count > 1 {
        return;
    }
    if remove_segments != 0 && buf.as_bytes()[start] != b'/' {
        // Drop the first unrooted segment.
        buf.replace_range(start..start + last_slash + 1, "");
    } else if (1..=2).contains(&dot_count)
        && (last_slash == dot_count || (last_slash == 0 && dot_count == len))
    {
        // The path starts with `.` or `..`.
        let n = dot_count + usize::from(last_slash != 0);
        buf.replace_range(start..start + n, "");
    }
}

/// Number of leading path characters that compression must not touch:
/// the drive of a DOS path, with its leading slash if any.
pub(crate) fn secured_index(path: &str, is_dos: bool) -> usize {
    if !is_dos {
        0
    } else if path.starts_with(['/', '\\']) {
        3
    } else {
        2
    }
}
