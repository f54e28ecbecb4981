// Usage text. Printed for `--help` and, prefixed with an error message,
// for usage errors.

use std::io::{self, Write};

const BANNER: &str = "Back office for My App";

pub fn usage(out: &mut dyn Write, message: Option<&str>) -> io::Result<()> {
    writeln!(out, "\n{}\n", message.unwrap_or(BANNER))?;
    writeln!(out, " add:")?;
    writeln!(out, "   order: backoffice add order <id> --amount=<int> --api=<string>")?;
    writeln!(out, "          backoffice add order <id> -n=<int> --api=<string>\n")?;
    writeln!(out, " list:")?;
    writeln!(out, "   cats:  backoffice list cats")?;
    writeln!(out, "   ids:   backoffice list ids --cat=<string> --api=<string>")?;
    writeln!(out, "   ids:   backoffice list ids -c=<string> --api=<string>")?;
    writeln!(out, "\n-=interactive mode=-\n")?;
    writeln!(out, "run: backoffice")?;
    writeln!(out, "run: backoffice --api {{API_URL}}")?;
    writeln!(out, "\n-=help=-\n")?;
    writeln!(out, "run: backoffice --help")?;
    writeln!(out, "run: backoffice -h\n")?;
    Ok(())
}

/// Usage for the two-positional order form.
pub fn legacy_usage(out: &mut dyn Write, message: Option<&str>) -> io::Result<()> {
    writeln!(out, "\n{}\n", message.unwrap_or(BANNER))?;
    writeln!(out, " usage: backoffice <id> <amount>")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(message: Option<&str>) -> String {
        let mut buf = Vec::new();
        usage(&mut buf, message).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn banner_is_the_default_heading() {
        let text = render(None);
        assert!(text.starts_with("\nBack office for My App\n"));
        assert!(text.contains("backoffice list ids -c=<string>"));
        assert!(text.contains("run: backoffice --api {API_URL}"));
    }

    #[test]
    fn message_replaces_the_banner() {
        let text = render(Some("Error: --cat flag is required"));
        assert!(text.starts_with("\nError: --cat flag is required\n"));
        assert!(!text.contains("Back office for My App"));
    }

    #[test]
    fn legacy_usage_shows_positional_form() {
        let mut buf = Vec::new();
        legacy_usage(&mut buf, Some("Error: amount must be an integer")).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("Error: amount must be an integer"));
        assert!(text.contains("usage: backoffice <id> <amount>"));
    }
}
