//! Streaming XML writer.
//!
//! Elements form an explicit stack: `begin` stages an opening tag that
//! stays unterminated until the element receives attributes, text, or a
//! child. `end` then decides between a self-closing tag (nothing was ever
//! added) and a full closing tag. Whether an element is a leaf is a
//! runtime property of its lifetime, not a static one.
//!
//! Attribute and text serialization performs no escaping; callers must
//! pre-sanitize. Floats are always formatted as `%.10e` with a period
//! decimal separator, independent of the host locale.

use super::sink::XmlSink;
use crate::util::{Error, Result};

/// Format a float the way the document expects: `%.10e`.
pub fn format_scientific(value: f32) -> String {
    let formatted = format!("{:.10e}", value);
    match formatted.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(rest) => ('-', rest),
                None => ('+', exponent),
            };
            format!("{}e{}{:0>2}", mantissa, sign, digits)
        }
        None => formatted,
    }
}

enum Body {
    Empty,
    Text,
    Children,
}

struct Frame {
    name: String,
    enabled: bool,
    open_pending: bool,
    body: Body,
}

/// Streaming element-stack writer over an [`XmlSink`].
pub struct XmlWriter<S: XmlSink> {
    sink: S,
    stack: Vec<Frame>,
}

impl<S: XmlSink> XmlWriter<S> {
    /// Create a writer and emit the XML declaration.
    pub fn new(mut sink: S) -> Result<Self> {
        sink.write_bytes(b"<?xml version=\"1.0\" encoding=\"utf-8\"?>\n")?;
        Ok(Self {
            sink,
            stack: Vec::new(),
        })
    }

    fn write_str(&mut self, s: &str) -> Result<()> {
        self.sink.write_bytes(s.as_bytes())
    }

    fn write_indent(&mut self, depth: usize) -> Result<()> {
        for _ in 0..depth {
            self.sink.write_bytes(b"  ")?;
        }
        Ok(())
    }

    /// Terminate the staged opening tags of all enabled ancestors; they
    /// are about to receive an emitted descendant.
    fn terminate_pending_opens(&mut self) -> Result<()> {
        for i in 0..self.stack.len() {
            if !self.stack[i].enabled {
                continue;
            }
            if self.stack[i].open_pending {
                self.sink.write_bytes(b">\n")?;
                self.stack[i].open_pending = false;
            }
            if matches!(self.stack[i].body, Body::Text) {
                return Err(Error::WriteFailed(format!(
                    "element <{}> mixes text content with children",
                    self.stack[i].name
                )));
            }
            self.stack[i].body = Body::Children;
        }
        Ok(())
    }

    /// Open an element.
    pub fn begin(&mut self, name: &str) -> Result<()> {
        self.begin_opt(name, true)
    }

    /// Open an element that only emits when `output` is true. A disabled
    /// element participates in the stack so descendants stay consistent,
    /// but writes none of its own tags, attributes, or text.
    pub fn begin_opt(&mut self, name: &str, output: bool) -> Result<()> {
        if output {
            self.terminate_pending_opens()?;
            let depth = self.stack.len();
            self.write_indent(depth)?;
            self.sink.write_bytes(b"<")?;
            self.write_str(name)?;
        }
        self.stack.push(Frame {
            name: name.to_string(),
            enabled: output,
            open_pending: output,
            body: Body::Empty,
        });
        Ok(())
    }

    /// Add an attribute. Only valid before the element receives text or
    /// children.
    pub fn attr(&mut self, name: &str, value: &str) -> Result<()> {
        let frame = self
            .stack
            .last()
            .ok_or_else(|| Error::WriteFailed("attribute outside any element".to_string()))?;
        if !frame.enabled {
            return Ok(());
        }
        if !frame.open_pending {
            return Err(Error::WriteFailed(format!(
                "attribute \"{}\" after content of <{}>",
                name, frame.name
            )));
        }
        self.write_str(" ")?;
        self.write_str(name)?;
        self.write_str("=\"")?;
        self.write_str(value)?;
        self.write_str("\"")
    }

    pub fn attr_usize(&mut self, name: &str, value: usize) -> Result<()> {
        self.attr(name, &value.to_string())
    }

    pub fn attr_f32(&mut self, name: &str, value: f32) -> Result<()> {
        self.attr(name, &format_scientific(value))
    }

    /// Add text content to the current element.
    pub fn text(&mut self, content: &str) -> Result<()> {
        let frame = self
            .stack
            .last_mut()
            .ok_or_else(|| Error::WriteFailed("text outside any element".to_string()))?;
        if !frame.enabled {
            return Ok(());
        }
        match frame.body {
            Body::Children => {
                return Err(Error::WriteFailed(format!(
                    "element <{}> mixes children with text content",
                    frame.name
                )))
            }
            Body::Empty if frame.open_pending => {
                frame.open_pending = false;
                frame.body = Body::Text;
                self.sink.write_bytes(b">")?;
            }
            _ => {}
        }
        self.write_str(content)
    }

    /// Write floats as space-separated `%.10e` text.
    pub fn text_floats(&mut self, values: impl IntoIterator<Item = f32>) -> Result<()> {
        let mut first = true;
        for value in values {
            if !first {
                self.text(" ")?;
            }
            first = false;
            self.text(&format_scientific(value))?;
        }
        Ok(())
    }

    /// Write integers as space-separated text.
    pub fn text_ints(&mut self, values: impl IntoIterator<Item = i64>) -> Result<()> {
        let mut first = true;
        for value in values {
            if !first {
                self.text(" ")?;
            }
            first = false;
            self.text(&value.to_string())?;
        }
        Ok(())
    }

    /// Write names as space-separated text.
    pub fn text_names<'n>(&mut self, values: impl IntoIterator<Item = &'n str>) -> Result<()> {
        let mut first = true;
        for value in values {
            if !first {
                self.text(" ")?;
            }
            first = false;
            self.text(value)?;
        }
        Ok(())
    }

    /// Close the current element. Emits a self-closing tag when nothing
    /// was added during the element's lifetime.
    pub fn end(&mut self) -> Result<()> {
        let frame = self
            .stack
            .pop()
            .ok_or_else(|| Error::WriteFailed("unbalanced element close".to_string()))?;
        if !frame.enabled {
            return Ok(());
        }
        match frame.body {
            Body::Empty => self.sink.write_bytes(b"/>\n"),
            Body::Text => {
                self.write_str("</")?;
                self.write_str(&frame.name)?;
                self.sink.write_bytes(b">\n")
            }
            Body::Children => {
                let depth = self.stack.len();
                self.write_indent(depth)?;
                self.write_str("</")?;
                self.write_str(&frame.name)?;
                self.sink.write_bytes(b">\n")
            }
        }
    }

    /// Convenience: `<name>text</name>`.
    pub fn element_text(&mut self, name: &str, content: &str) -> Result<()> {
        self.begin(name)?;
        self.text(content)?;
        self.end()
    }

    /// Finish the document. All elements must have been closed.
    pub fn finish(mut self) -> Result<()> {
        if let Some(frame) = self.stack.last() {
            return Err(Error::WriteFailed(format!(
                "document finished with <{}> still open",
                frame.name
            )));
        }
        self.sink.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collada::sink::VecSink;

    fn build<F: FnOnce(&mut XmlWriter<VecSink>) -> Result<()>>(f: F) -> String {
        let mut writer = XmlWriter::new(VecSink::new()).unwrap();
        f(&mut writer).unwrap();
        let sink = writer.sink;
        String::from_utf8(sink.into_bytes()).unwrap()
    }

    #[test]
    fn test_leaf_self_closes() {
        let out = build(|w| {
            w.begin("node")?;
            w.attr("id", "a")?;
            w.end()
        });
        assert!(out.ends_with("<node id=\"a\"/>\n"));
    }

    #[test]
    fn test_parent_closes_fully() {
        let out = build(|w| {
            w.begin("outer")?;
            w.begin("inner")?;
            w.end()?;
            w.end()
        });
        assert!(out.contains("<outer>\n  <inner/>\n</outer>\n"));
    }

    #[test]
    fn test_text_closes_inline() {
        let out = build(|w| w.element_text("up_axis", "Z_UP"));
        assert!(out.contains("<up_axis>Z_UP</up_axis>\n"));
    }

    #[test]
    fn test_disabled_element_emits_nothing_but_children_do() {
        let out = build(|w| {
            w.begin("root")?;
            w.begin_opt("optional", false)?;
            w.begin("child")?;
            w.end()?;
            w.end()?;
            w.end()
        });
        assert!(!out.contains("optional"));
        assert!(out.contains("<child/>"));
        assert!(out.contains("<root>"));
        assert!(out.contains("</root>"));
    }

    #[test]
    fn test_attribute_after_content_rejected() {
        let mut writer = XmlWriter::new(VecSink::new()).unwrap();
        writer.begin("node").unwrap();
        writer.text("body").unwrap();
        assert!(writer.attr("id", "late").is_err());
    }

    #[test]
    fn test_format_scientific_matches_c_printf() {
        assert_eq!(format_scientific(1.0), "1.0000000000e+00");
        assert_eq!(format_scientific(0.0), "0.0000000000e+00");
        assert_eq!(format_scientific(-2.5), "-2.5000000000e+00");
        assert_eq!(format_scientific(0.001), "1.0000000475e-03");
    }

    #[test]
    fn test_float_array_text() {
        let out = build(|w| {
            w.begin("float_array")?;
            w.text_floats([1.0, -1.0])?;
            w.end()
        });
        assert!(out.contains(">1.0000000000e+00 -1.0000000000e+00</float_array>"));
    }
}
