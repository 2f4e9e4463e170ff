use cfg_aliases::cfg_aliases;

fn main() {
    // Setup alias to reduce `cfg` boilerplate.
    cfg_aliases! {
        // Systems.
        wasm_platform: { target_family = "wasm" },
        free_unix: {
            any(
                target_os = "linux",
                target_os = "dragonfly",
                target_os = "freebsd",
                target_os = "netbsd",
                target_os = "openbsd"
            )
        },

        // Backends.
        egl_backend: { all(feature = "egl", any(windows, free_unix), not(wasm_platform)) },
    }
}
