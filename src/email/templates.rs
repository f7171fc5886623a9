use askama::Template;

/// Contact form submission as rendered into the notification mail.
#[derive(Template)]
#[template(path = "email/contact.html")]
pub struct ContactMail<'a> {
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub email: &'a str,
    pub phone: Option<&'a str>,
    pub company: &'a str,
    pub talent: &'a [String],
    pub website: Option<&'a str>,
    pub doing: &'a str,
    pub refer: Option<&'a str>,
    pub subject: &'a str,
    pub message: &'a str,
}

impl ContactMail<'_> {
    pub fn render_html(&self) -> Result<String, askama::Error> {
        self.render()
    }
}
