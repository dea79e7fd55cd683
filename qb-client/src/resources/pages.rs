use serde::{Deserialize, Serialize};

use crate::{Client, Error, Result, xml::Param};

/// Page content types accepted by `API_AddReplaceDBPage`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PageType {
    /// XSL stylesheets and HTML pages.
    #[default]
    Html,
    /// Exact Forms.
    ExactForm,
}

impl PageType {
    fn code(&self) -> &'static str {
        match self {
            PageType::Html => "1",
            PageType::ExactForm => "3",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    #[serde(rename(serialize = "body", deserialize = "pagebody"), default)]
    pub body: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageId {
    #[serde(rename(serialize = "pageId", deserialize = "pageID"), default)]
    pub page_id: u64,
}

impl Client {
    pub fn get_page(&self, app_id: &str, page_id: &str) -> Result<Page> {
        self.xml_call(
            app_id,
            "API_GetDBPage",
            &[("pageID", Param::Text(page_id.to_string()))],
        )
    }

    pub fn create_page(&self, app_id: &str, name: &str, page_type: PageType, body: &str) -> Result<PageId> {
        if name.is_empty() {
            return Err(Error::invalid_input("page name required"));
        }
        self.xml_call(
            app_id,
            "API_AddReplaceDBPage",
            &[
                ("pagename", Param::Text(name.to_string())),
                ("pagetype", Param::Text(page_type.code().to_string())),
                ("pagebody", Param::CData(body.to_string())),
            ],
        )
    }

    /// Replace a page's body, addressing the page by id or by name.
    pub fn update_page(
        &self,
        app_id: &str,
        page_id: Option<u64>,
        name: Option<&str>,
        body: &str,
    ) -> Result<PageId> {
        let mut params = Vec::new();
        match (page_id, name) {
            (Some(id), _) if id > 0 => params.push(("pageid", Param::Text(id.to_string()))),
            (_, Some(name)) if !name.is_empty() => params.push(("pagename", Param::Text(name.to_string()))),
            _ => return Err(Error::invalid_input("ID or name required")),
        }
        params.push(("pagebody", Param::CData(body.to_string())));
        self.xml_call(app_id, "API_AddReplaceDBPage", &params)
    }
}
