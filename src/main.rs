//! dayclock main entrypoint.

use dayclock::run;
use dayclock::ui::messages::error;

fn main() {
    if let Err(e) = run() {
        error(&e);
        std::process::exit(e.exit_code());
    }
}
