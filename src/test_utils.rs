/*
 * Test utilities and mock helpers for odroidc-lights
 *
 * This module provides common test fixtures: a fake pwm-ctrl sysfs
 * directory, a board profile pointed at it, and an in-memory module
 * loader that records calls instead of touching the kernel.
 */

#[cfg(test)]
pub mod test_utils {
    use crate::config::{BoardProfile, KernelModule};
    use crate::kmod::{KmodError, ModuleLoader};
    use std::fs;
    use std::io;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Creates a pwm-ctrl stand-in: duty0/enable0/freq0 files in a tempdir,
    /// all starting at "0\n" like a freshly probed controller.
    pub fn create_mock_pwm_dir() -> TempDir {
        let dir = TempDir::new().unwrap();
        for name in ["duty0", "enable0", "freq0"] {
            fs::write(dir.path().join(name), "0\n").unwrap();
        }
        dir
    }

    /// Board profile pointing at a mock pwm dir. The module images do not
    /// exist on disk; tests pair this with a loader that never reads them.
    pub fn create_test_profile(dir: &Path) -> BoardProfile {
        BoardProfile {
            duty_path: dir.join("duty0"),
            enable_path: dir.join("enable0"),
            freq_path: dir.join("freq0"),
            modules: vec![
                KernelModule {
                    image: dir.join("pwm-meson.ko"),
                    name: "pwm-meson".to_string(),
                },
                KernelModule {
                    image: dir.join("pwm-ctrl.ko"),
                    name: "pwm-ctrl".to_string(),
                },
            ],
            frequency_hz: 1000,
        }
    }

    /// ModuleLoader that counts calls and records unload order. The fail_*
    /// flags make the corresponding operation return EBUSY-style errors.
    #[derive(Debug, Default)]
    pub struct CountingLoader {
        pub loads: AtomicUsize,
        pub unloads: AtomicUsize,
        pub loaded: Mutex<Vec<String>>,
        pub unloaded: Mutex<Vec<String>>,
        pub fail_load: bool,
        pub fail_unload: bool,
    }

    impl CountingLoader {
        pub fn failing_load() -> CountingLoader {
            CountingLoader {
                fail_load: true,
                ..CountingLoader::default()
            }
        }

        pub fn failing_unload() -> CountingLoader {
            CountingLoader {
                fail_unload: true,
                ..CountingLoader::default()
            }
        }
    }

    impl ModuleLoader for CountingLoader {
        fn load(&self, image: &Path) -> Result<(), KmodError> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            self.loaded
                .lock()
                .unwrap()
                .push(image.display().to_string());
            if self.fail_load {
                return Err(KmodError::Load {
                    module: image.to_path_buf(),
                    source: io::Error::from_raw_os_error(libc::ENOEXEC),
                });
            }
            Ok(())
        }

        fn unload(&self, name: &str) -> Result<(), KmodError> {
            self.unloads.fetch_add(1, Ordering::SeqCst);
            self.unloaded.lock().unwrap().push(name.to_string());
            if self.fail_unload {
                return Err(KmodError::Unload {
                    module: name.to_string(),
                    source: io::Error::from_raw_os_error(libc::EBUSY),
                });
            }
            Ok(())
        }
    }
}
