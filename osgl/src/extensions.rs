//! Lookups in space separated extension strings.

/// Whether `token` is one of the space separated words of `extensions`.
///
/// Only whole words match, so `GL_ARB_fo` isn't found in `GL_ARB_foo`.
///
/// ```
/// use osgl::string_in_extension_string;
///
/// assert!(string_in_extension_string("GL_ARB_foo", "x GL_ARB_foo y"));
/// assert!(!string_in_extension_string("GL_ARB_foo", "GL_ARB_fo GL_ARB_foo_bar"));
/// ```
pub fn string_in_extension_string(token: &str, extensions: &str) -> bool {
    if token.is_empty() || token.contains(' ') {
        return false;
    }

    extensions.split(' ').any(|extension| extension == token)
}
