use logos::Logos;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Logos)]
#[logos(skip r"[ \t\r\n\f]+")]
pub enum Token<'a> {
    #[token("|")]
    Pipe,
    #[token("<")]
    Read,
    #[token(">")]
    Write,
    #[token("&")]
    Background,

    #[regex(r"[^ \t\r\n\f|<>&]+")]
    Word(&'a str),
}

impl<'a> Token<'a> {
    pub fn is_marker(&self) -> bool {
        !matches!(self, Self::Word(_))
    }
}

/// Every byte is whitespace, a marker or part of a word, so the lexer has
/// no error case to surface.
pub fn tokenize(s: &str) -> Vec<Token<'_>> {
    Token::lexer(s).filter_map(Result::ok).collect()
}
