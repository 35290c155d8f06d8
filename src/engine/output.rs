use colored::{Color, Colorize};
use compio::runtime::spawn;
use futures::{AsyncBufReadExt, AsyncRead, StreamExt, io::BufReader};
use tracing::debug;

/// Forwards one child output stream to the terminal, line by line, each
/// line prefixed with a colored label.
pub(crate) fn spawn_line_printer<R>(stream: R, label: String, color: Color)
where
    R: AsyncRead + Unpin + 'static,
{
    spawn(async move {
        let reader = BufReader::new(stream);
        let mut lines = reader.lines();

        while let Some(line_result) = lines.next().await {
            match line_result {
                Ok(line) => {
                    if !line.trim().is_empty() {
                        print_from_stream(&label, color, line.trim());
                    }
                }
                Err(e) => {
                    debug!("Error reading output for '{}': {}", label, e);
                }
            }
        }
    })
    .detach();
}

fn print_from_stream(label: &str, color: Color, line: &str) {
    if supports_color::on(supports_color::Stream::Stdout).is_some() {
        println!("{} {}", format!("[{label}]").color(color), line);
    } else {
        println!("[{label}] {line}");
    }
}
