//! Streaming decode loop.
//!
//! The loop pulls tokens from a [`TokenStream`] until it meets the start tag
//! of a record (`<url>` or `<sitemap>`), hands the stream to the matching
//! [`RecordHandler`] to build one record from that element's subtree, and
//! passes the record to the consumer before looking for the next one.
//!
//! # Guarantees
//!
//! - One record in flight at a time; nothing is kept after the consumer returns.
//! - Records reach the consumer in document order, exactly once each.
//! - The consumer's `Err` stops the loop before another token is read and is
//!   returned as [`Error::Stopped`] unchanged.
//! - A structural failure stops the loop; the record being built is dropped,
//!   never delivered.

pub mod builders;

use crate::error::{DecodeError, Error};
use quick_xml::Reader;
use quick_xml::encoding::Decoder;
use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::{BytesStart, Event as XmlEvent};
use std::io::BufRead;
use tracing::{debug, trace};

pub use builders::{EntryHandler, IndexEntryHandler};

/// An element start as seen by the loop and the builders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementStart {
    /// Local name, namespace prefix stripped (`image:loc` -> `loc`).
    pub name: String,
    /// `true` for a self-closing tag, which has no subtree to consume.
    pub empty: bool,
}

/// Owned lexical event, detached from the reader's buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// `<name ...>`
    Start(ElementStart),
    /// `</name>`
    End,
    /// Character data, CDATA, or a resolved entity reference.
    Text(String),
    /// No more input.
    Eof,
}

/// Forward-only cursor over the XML tokens of a byte source.
///
/// Comments, processing instructions, the XML declaration and doctypes are
/// dropped; everything else is surfaced as a [`Token`].
pub struct TokenStream<R> {
    reader: Reader<R>,
    buf: Vec<u8>,
}

impl<R: BufRead> TokenStream<R> {
    /// Wrap a buffered byte source.
    pub fn new(source: R) -> Self {
        Self {
            reader: Reader::from_reader(source),
            buf: Vec::with_capacity(4096),
        }
    }

    /// Read the next token.
    pub fn next_token(&mut self) -> Result<Token, DecodeError> {
        let decoder = self.reader.decoder();
        loop {
            self.buf.clear();
            let token = match self.reader.read_event_into(&mut self.buf)? {
                XmlEvent::Start(ref e) => Token::Start(ElementStart {
                    name: local_name(decoder, e)?,
                    empty: false,
                }),
                XmlEvent::Empty(ref e) => Token::Start(ElementStart {
                    name: local_name(decoder, e)?,
                    empty: true,
                }),
                XmlEvent::End(_) => Token::End,
                XmlEvent::Text(ref e) => Token::Text(decoder.decode(e)?.into_owned()),
                XmlEvent::CData(ref e) => Token::Text(decoder.decode(e)?.into_owned()),
                XmlEvent::GeneralRef(ref e) => {
                    if let Some(ch) = e.resolve_char_ref()? {
                        Token::Text(ch.to_string())
                    } else {
                        let name = decoder.decode(e)?;
                        match resolve_predefined_entity(&name) {
                            Some(value) => Token::Text(value.to_string()),
                            None => Token::Text(format!("&{name};")),
                        }
                    }
                }
                XmlEvent::Eof => Token::Eof,
                _ => continue,
            };
            return Ok(token);
        }
    }

    /// Consume the rest of an element whose start tag was just read,
    /// including its end tag. Nothing is read for a self-closing element.
    pub fn skip(&mut self, element: &ElementStart) -> Result<(), DecodeError> {
        if element.empty {
            return Ok(());
        }
        let mut depth = 0usize;
        loop {
            match self.next_token()? {
                Token::Start(child) if !child.empty => depth += 1,
                Token::End if depth == 0 => return Ok(()),
                Token::End => depth -= 1,
                Token::Eof => return Err(unexpected_eof(element)),
                _ => {}
            }
        }
    }

    /// Collect the text of a leaf element and consume it through its end tag.
    ///
    /// Text belonging to nested elements is discarded. The result is trimmed
    /// of surrounding whitespace.
    pub fn read_text(&mut self, element: &ElementStart) -> Result<String, DecodeError> {
        if element.empty {
            return Ok(String::new());
        }
        let mut text = String::new();
        loop {
            match self.next_token()? {
                Token::Text(chunk) => text.push_str(&chunk),
                Token::Start(child) => self.skip(&child)?,
                Token::End => break,
                Token::Eof => return Err(unexpected_eof(element)),
            }
        }
        Ok(text.trim().to_string())
    }

    /// Visit each direct child element of `parent`, then consume the parent's
    /// end tag.
    ///
    /// `visit` is called with the stream positioned just after the child's
    /// start tag and must consume that child entirely, for example with
    /// [`TokenStream::read_text`] or [`TokenStream::skip`]. Loose text between
    /// children is ignored.
    pub fn for_each_child<F>(&mut self, parent: &ElementStart, mut visit: F) -> Result<(), DecodeError>
    where
        F: FnMut(&mut Self, ElementStart) -> Result<(), DecodeError>,
    {
        if parent.empty {
            return Ok(());
        }
        loop {
            match self.next_token()? {
                Token::Start(child) => visit(self, child)?,
                Token::End => return Ok(()),
                Token::Text(_) => {}
                Token::Eof => return Err(unexpected_eof(parent)),
            }
        }
    }
}

fn local_name(decoder: Decoder, e: &BytesStart<'_>) -> Result<String, DecodeError> {
    Ok(decoder.decode(e.local_name().as_ref())?.into_owned())
}

fn unexpected_eof(element: &ElementStart) -> DecodeError {
    DecodeError::UnexpectedEof {
        tag: element.name.clone(),
    }
}

/// Builds one kind of record from the subtree of its start element.
///
/// Implementations must consume the record element through its matching end
/// tag, and nothing past it, whatever children it contains.
pub trait RecordHandler {
    /// Local name of the element that starts a record.
    const RECORD_TAG: &'static str;

    /// Record produced for each match.
    type Record;

    /// Build a record. `start` has just been read from `stream`.
    fn build<R: BufRead>(
        stream: &mut TokenStream<R>,
        start: &ElementStart,
    ) -> Result<Self::Record, DecodeError>;
}

/// Drive `source` to the end, dispatching every `H::RECORD_TAG` record to
/// `consumer`.
///
/// Returns `Ok(())` once the input is exhausted with every element closed,
/// `Error::Stopped` with the consumer's value if it returned `Err`, or
/// `Error::Decode` on malformed or truncated input.
pub fn decode_loop<H, R, F, E>(source: R, mut consumer: F) -> Result<(), Error<E>>
where
    H: RecordHandler,
    R: BufRead,
    F: FnMut(&H::Record) -> Result<(), E>,
{
    decode_records::<H, _, _, _>(source, |record| consumer(&record))
}

/// [`decode_loop`] handing each record over by value.
pub(crate) fn decode_records<H, R, F, E>(source: R, mut consumer: F) -> Result<(), Error<E>>
where
    H: RecordHandler,
    R: BufRead,
    F: FnMut(H::Record) -> Result<(), E>,
{
    let mut stream = TokenStream::new(source);
    // Wrapper elements (`<urlset>`, `<sitemapindex>`, ...) still open.
    let mut open: Vec<String> = Vec::new();
    let mut records = 0usize;

    loop {
        match stream.next_token()? {
            Token::Start(start) if start.name == H::RECORD_TAG => {
                let record = H::build(&mut stream, &start)?;
                records += 1;
                trace!(tag = H::RECORD_TAG, index = records, "Dispatching record");
                if let Err(e) = consumer(record) {
                    debug!(tag = H::RECORD_TAG, records, "Consumer stopped parsing");
                    return Err(Error::Stopped(e));
                }
            }
            Token::Start(start) => {
                if !start.empty {
                    open.push(start.name);
                }
            }
            Token::End => {
                open.pop();
            }
            Token::Eof => {
                if let Some(tag) = open.pop() {
                    debug!(%tag, records, "Document ended with open elements");
                    return Err(DecodeError::UnexpectedEof { tag }.into());
                }
                debug!(tag = H::RECORD_TAG, records, "Reached end of document");
                return Ok(());
            }
            Token::Text(_) => {}
        }
    }
}
