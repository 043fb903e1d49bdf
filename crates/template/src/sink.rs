use std::io;

/// A destination for rendered text.
///
/// Rendering produces text, not bytes: how characters become bytes is decided
/// by the sink (an encoding writer for files, a plain `String` in memory).
pub trait TextSink {
    fn write_text(&mut self, text: &str) -> io::Result<()>;
}

impl TextSink for String {
    fn write_text(&mut self, text: &str) -> io::Result<()> {
        self.push_str(text);
        Ok(())
    }
}

impl<T: TextSink + ?Sized> TextSink for &mut T {
    fn write_text(&mut self, text: &str) -> io::Result<()> {
        (**self).write_text(text)
    }
}
