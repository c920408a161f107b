//! # Server-Rendered Pages
//!
//! The account-facing pages (home, about, login, registration) are small
//! static documents with an optional notice banner. Every interpolated value
//! passes through [`escape`].

use std::fmt::Write;

/// A page of the account-facing site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Home,
    About,
    Login,
    Register,
}

/// A banner shown above the page content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Error(String),
}

impl Page {
    /// Document title.
    pub fn title(&self) -> &'static str {
        match self {
            Self::Home => "Bookshelf",
            Self::About => "About",
            Self::Login => "Sign in",
            Self::Register => "Register",
        }
    }

    /// Render the full HTML document.
    pub fn render(&self, notice: Option<&Notice>) -> String {
        let mut html = String::with_capacity(1024);
        html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
        let _ = writeln!(html, "<title>{}</title>", escape(self.title()));
        html.push_str("</head>\n<body>\n");
        html.push_str(
            "<nav><a href=\"/\">Home</a> | <a href=\"/books\">Books</a> | \
             <a href=\"/auth/\">Sign in</a> | <a href=\"/register/\">Register</a> | \
             <a href=\"/about/\">About</a></nav>\n",
        );
        let _ = writeln!(html, "<h1>{}</h1>", escape(self.title()));

        match notice {
            Some(Notice::Success(text)) => {
                let _ = writeln!(html, "<p class=\"notice success\">{}</p>", escape(text));
            }
            Some(Notice::Error(text)) => {
                let _ = writeln!(html, "<p class=\"notice error\">{}</p>", escape(text));
            }
            None => {}
        }

        html.push_str(self.content());
        html.push_str("</body>\n</html>\n");
        html
    }

    fn content(&self) -> &'static str {
        match self {
            Self::Home => {
                "<p>A catalog of books. Browse the collection as JSON at \
                 <a href=\"/books\">/books</a>.</p>\n"
            }
            Self::About => {
                "<p>Bookshelf keeps a catalog of books and the accounts of \
                 the people who manage it.</p>\n"
            }
            Self::Login => {
                "<form method=\"post\" action=\"/auth/\">\n\
                 <label>Email <input type=\"email\" name=\"email\" required></label>\n\
                 <label>Password <input type=\"password\" name=\"password\" required></label>\n\
                 <button type=\"submit\">Sign in</button>\n\
                 </form>\n"
            }
            Self::Register => {
                "<form method=\"post\" action=\"/register/\">\n\
                 <label>First name <input type=\"text\" name=\"firstname\" required></label>\n\
                 <label>Last name <input type=\"text\" name=\"lastname\" required></label>\n\
                 <label>Email <input type=\"email\" name=\"email\" required></label>\n\
                 <label>Password <input type=\"password\" name=\"password\" required></label>\n\
                 <button type=\"submit\">Register</button>\n\
                 </form>\n"
            }
        }
    }
}

/// Escape text for inclusion in HTML element content or a quoted attribute.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
