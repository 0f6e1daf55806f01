use super::header::*;
use super::question::*;
use super::resource::*;
use super::*;
use shared::error::*;

/// The sections of a DNS message, in wire order.
#[derive(Default, Copy, Clone, PartialOrd, PartialEq, Eq, Debug)]
pub(crate) enum Section {
    #[default]
    NotStarted,
    Header,
    Questions,
    Answers,
    Authorities,
    Additionals,
    Done,
}

impl Section {
    fn next(self) -> Section {
        match self {
            Section::NotStarted => Section::Header,
            Section::Header => Section::Questions,
            Section::Questions => Section::Answers,
            Section::Answers => Section::Authorities,
            Section::Authorities => Section::Additionals,
            Section::Additionals | Section::Done => Section::Done,
        }
    }
}

/// A Parser walks a DNS message one record at a time.
///
/// Sections must be consumed in order: call [`start`](Parser::start), then
/// read or skip every question, every answer, and so on. Each reader returns
/// [`Error::ErrSectionDone`] once its section's count is exhausted, after
/// which the next section becomes available.
#[derive(Default)]
pub struct Parser<'a> {
    msg: &'a [u8],
    header: Header,

    section: Section,
    off: usize,
    index: usize,
    max_name_len: usize,
}

impl<'a> Parser<'a> {
    /// Creates a parser whose decoded names may be at most `max_name_len`
    /// bytes long.
    pub fn new(max_name_len: usize) -> Self {
        Parser {
            max_name_len,
            ..Default::default()
        }
    }

    /// Parses the header and enables the parsing of questions.
    pub fn start(&mut self, msg: &'a [u8]) -> Result<Header> {
        self.msg = msg;
        self.header = Header::default();
        self.off = self.header.unpack(msg, 0)?;
        self.section = Section::Questions;
        self.index = 0;
        Ok(self.header)
    }

    /// Offset of the next unparsed byte.
    pub fn offset(&self) -> usize {
        self.off
    }

    fn check_advance(&mut self, sec: Section) -> Result<()> {
        if self.section < sec {
            return Err(Error::ErrNotStarted);
        }
        if self.section > sec {
            return Err(Error::ErrSectionDone);
        }
        if self.index == self.header.count(sec) as usize {
            self.index = 0;
            self.section = self.section.next();
            return Err(Error::ErrSectionDone);
        }
        Ok(())
    }

    fn resource(&mut self, sec: Section) -> Result<Resource> {
        self.check_advance(sec)?;
        let mut r = Resource::default();
        self.off = r.unpack(self.msg, self.off, self.max_name_len)?;
        self.index += 1;
        Ok(r)
    }

    fn skip_resource(&mut self, sec: Section) -> Result<()> {
        self.check_advance(sec)?;
        self.off = Resource::skip(self.msg, self.off)?;
        self.index += 1;
        Ok(())
    }

    fn all_resources(&mut self, sec: Section) -> Result<Vec<Resource>> {
        let mut rs = vec![];
        loop {
            match self.resource(sec) {
                Err(err) => {
                    if err == Error::ErrSectionDone {
                        return Ok(rs);
                    } else {
                        return Err(err);
                    }
                }
                Ok(r) => rs.push(r),
            }
        }
    }

    fn skip_all_resources(&mut self, sec: Section) -> Result<()> {
        loop {
            if let Err(err) = self.skip_resource(sec) {
                if err == Error::ErrSectionDone {
                    return Ok(());
                } else {
                    return Err(err);
                }
            }
        }
    }

    /// Parses a single question.
    pub fn question(&mut self) -> Result<Question> {
        self.check_advance(Section::Questions)?;
        let mut q = Question::default();
        self.off = q.unpack(self.msg, self.off, self.max_name_len)?;
        self.index += 1;
        Ok(q)
    }

    /// Parses all questions.
    pub fn all_questions(&mut self) -> Result<Vec<Question>> {
        let mut qs = vec![];
        loop {
            match self.question() {
                Err(err) => {
                    if err == Error::ErrSectionDone {
                        return Ok(qs);
                    } else {
                        return Err(err);
                    }
                }
                Ok(q) => qs.push(q),
            }
        }
    }

    /// Skips a single question without decoding its name.
    pub fn skip_question(&mut self) -> Result<()> {
        self.check_advance(Section::Questions)?;
        self.off = Question::skip(self.msg, self.off)?;
        self.index += 1;
        Ok(())
    }

    /// Skips all questions.
    pub fn skip_all_questions(&mut self) -> Result<()> {
        loop {
            if let Err(err) = self.skip_question() {
                if err == Error::ErrSectionDone {
                    return Ok(());
                } else {
                    return Err(err);
                }
            }
        }
    }

    /// Parses a single answer.
    pub fn answer(&mut self) -> Result<Resource> {
        self.resource(Section::Answers)
    }

    /// Parses all answers.
    pub fn all_answers(&mut self) -> Result<Vec<Resource>> {
        self.all_resources(Section::Answers)
    }

    /// Skips a single answer.
    pub fn skip_answer(&mut self) -> Result<()> {
        self.skip_resource(Section::Answers)
    }

    /// Skips all answers.
    pub fn skip_all_answers(&mut self) -> Result<()> {
        self.skip_all_resources(Section::Answers)
    }

    /// Parses a single authority record.
    pub fn authority(&mut self) -> Result<Resource> {
        self.resource(Section::Authorities)
    }

    /// Parses all authority records.
    pub fn all_authorities(&mut self) -> Result<Vec<Resource>> {
        self.all_resources(Section::Authorities)
    }

    /// Skips all authority records.
    pub fn skip_all_authorities(&mut self) -> Result<()> {
        self.skip_all_resources(Section::Authorities)
    }

    /// Parses a single additional record.
    pub fn additional(&mut self) -> Result<Resource> {
        self.resource(Section::Additionals)
    }

    /// Parses all additional records.
    pub fn all_additionals(&mut self) -> Result<Vec<Resource>> {
        self.all_resources(Section::Additionals)
    }

    /// Skips all additional records.
    pub fn skip_all_additionals(&mut self) -> Result<()> {
        self.skip_all_resources(Section::Additionals)
    }
}
