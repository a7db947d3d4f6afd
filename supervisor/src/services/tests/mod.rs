//! Service-specific tests
//!
//! Each service has its own test file; shared helpers live in `common`.

mod config_files;
mod console;

pub mod common {
    use std::path::{Path, PathBuf};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use crate::error::SupervisorResult;
    use crate::traits::Notifier;

    /// Standard timeout for async operations in tests
    pub const TEST_TIMEOUT: Duration = Duration::from_secs(5);

    /// Notifier that remembers every delivered message
    #[derive(Default)]
    pub struct RecordingNotifier {
        messages: Mutex<Vec<String>>,
    }

    impl RecordingNotifier {
        pub fn shared() -> Arc<Self> {
            Arc::new(Self::default())
        }

        pub fn messages(&self) -> Vec<String> {
            self.messages.lock().unwrap().clone()
        }

        pub fn count(&self, message: &str) -> usize {
            self.messages().iter().filter(|m| *m == message).count()
        }
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, _title: &str, message: &str) -> SupervisorResult<()> {
            self.messages.lock().unwrap().push(message.to_string());
            Ok(())
        }
    }

    /// Write an OpenVPN-style status artifact
    pub fn write_status(path: &Path, received: u64, sent: u64) {
        let content = format!(
            "OpenVPN STATISTICS\nUpdated,now\nTUN/TAP read bytes,{received}\nTUN/TAP write bytes,{sent}\nEND\n"
        );
        std::fs::write(path, content).unwrap();
    }

    /// Write an executable shell script standing in for the tunnel binary
    #[cfg(unix)]
    pub fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join(name);
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }
}
