//! Terminal rendering for cart notices.

use fashionhub_cart::{Notice, Notifier, Severity};

/// Notifier that prints notices the way a storefront would toast them.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    #[allow(clippy::print_stdout, clippy::print_stderr)]
    fn notify(&self, notice: Notice) {
        match notice.severity() {
            Severity::Success => println!("{notice}"),
            Severity::Error => eprintln!("error: {notice}"),
        }
    }
}
