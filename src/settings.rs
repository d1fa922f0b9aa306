//! Connection settings: the webhook URL edit buffer plus the Apps Script
//! glue code the operator pastes into the spreadsheet.

use crate::models::SheetConfig;

pub const SETUP_STEPS: [&str; 7] = [
    "Mở Google Sheet của bạn.",
    "Chọn <b>Extensions (Tiện ích mở rộng)</b> &gt; <b>Apps Script</b>.",
    "Dán đoạn mã script được cung cấp bên dưới vào.",
    "Nhấn <b>Deploy</b> &gt; <b>New Deployment</b>.",
    "Chọn Type là <b>Web App</b>.",
    "Set \"Who has access\" thành <b>Anyone</b>.",
    "Copy URL nhận được và dán vào ô bên trên.",
];

pub const APPS_SCRIPT_TEMPLATE: &str = r#"function doGet() {
  var sheet = SpreadsheetApp.getActiveSpreadsheet().getActiveSheet();
  var data = sheet.getDataRange().getValues();
  var headers = data[0];
  var result = [];
  for (var i = 1; i < data.length; i++) {
    var obj = {};
    for (var j = 0; j < headers.length; j++) {
      obj[headers[j]] = data[i][j];
    }
    result.push(obj);
  }
  return ContentService.createTextOutput(JSON.stringify(result))
    .setMimeType(ContentService.MimeType.JSON);
}

function doPost(e) {
  var sheet = SpreadsheetApp.getActiveSpreadsheet().getActiveSheet();
  var data = JSON.parse(e.postData.contents);
  if (sheet.getLastRow() == 0) {
    sheet.appendRow(["id", "fullName", "className", "birthDate", "createdAt"]);
  }
  sheet.appendRow([data.id, data.fullName, data.className, data.birthDate, data.createdAt]);
  return ContentService.createTextOutput("Success")
    .setMimeType(ContentService.MimeType.TEXT);
}"#;

/// Settings form state, seeded from the active configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsPanel {
    pub input_url: String,
}

impl SettingsPanel {
    pub fn seeded(config: &SheetConfig) -> Self {
        Self {
            input_url: config.google_script_url.clone(),
        }
    }

    /// The configuration to save. The URL is not validated.
    pub fn save(&self) -> SheetConfig {
        SheetConfig::new(self.input_url.trim())
    }
}
