// src/config/consts.rs
// Every SEI selector lives here. When the portal markup changes, this is the file to touch.

// Portal
pub const DEFAULT_LOGIN_URL: &str = "https://colaboragov.sei.gov.br/sip/modulos/MF/login_especial/login_especial.php?sigla_orgao_sistema=MGI&sigla_sistema=SEI";
pub const DEFAULT_ORGAO: &str = "MGI";

// Login form
pub const LOGIN_USER_ID: &str = "txtUsuario";
pub const LOGIN_PASSWORD_ID: &str = "pwdSenha";
pub const LOGIN_ORGAO_ID: &str = "selOrgao";
pub const LOGIN_SUBMIT_ID: &str = "Acessar";
pub const LOGIN_OK_CSS: &str = "img[title='Controle de Processos']";
pub const LOGIN_ERROR_BAR_ID: &str = "divInfraBarraLocalizacao";
pub const NOTICE_CLOSE_XPATH: &str = "/html/body/div[7]/div[2]/div[1]/div[3]/img";

// Unit selection
pub const UNIT_LINK_CSS: &str = "div.nav-item:nth-child(3) > div:nth-child(1) > a:nth-child(1)";
pub const UNIT_ORGAO_ID: &str = "selInfraOrgaoUnidade";
pub const UNIT_ROWS_CSS: &str = "form table tbody tr";

// Listing
pub const DETAILED_VIEW_LINK: &str = "Visualização detalhada";
pub const DETAIL_LEVEL_ID: &str = "ancNivelDetalhe";
pub const DETAIL_MODAL_FRAME: &str = "modal-frame";
pub const DETAIL_CHECKBOX_CLASS: &str = "infraCheckboxInput";
pub const DETAIL_ASSIGNMENT_ID: &str = "chkSinAtribuicao";
pub const DETAIL_SAVE_CSS: &str = "#divInfraBarraComandosSuperior button";

pub const LISTING_TABLE_ID: &str = "tblProcessosDetalhado";
pub const LISTING_ROWS_CSS: &str = "tbody > tr";
pub const NEXT_PAGE_TOP_ID: &str = "lnkInfraProximaPaginaSuperior";
pub const NEXT_PAGE_BOTTOM_ID: &str = "lnkInfraProximaPaginaInferior";

// Waits (seconds)
pub const ELEMENT_WAIT_SECS: u64 = 10;
pub const LOGIN_WAIT_SECS: u64 = 5;
pub const ALERT_WAIT_SECS: u64 = 3;
pub const NOTICE_WAIT_SECS: u64 = 3;
pub const FRAME_WAIT_SECS: u64 = 20;
pub const WAIT_POLL_MS: u64 = 250;

// Settle delay after clicks, drawn uniformly from this range
pub const SETTLE_MIN_MS: u64 = 1_000;
pub const SETTLE_MAX_MS: u64 = 2_000;

// Frame navigation retry
pub const FRAME_RETRY_ATTEMPTS: u32 = 3;
pub const FRAME_RETRY_DELAY_SECS: u64 = 2;

// Capture
pub const DEFAULT_MAX_PAGES: u32 = 1_000;
pub const ADVANCE_RETRY_ATTEMPTS: u32 = 3;
pub const ADVANCE_RETRY_DELAY_SECS: u64 = 1;

// Store
pub const DEFAULT_BASE_DIR: &str = "Bases";
pub const CASES_TABLE: &str = "processos";
/// Per-box responsible assignees, `{ "BOX": ["a@x", ...] }`, under the base directory.
pub const RESPONSIBLE_FILE: &str = "responsaveis.json";

// Driver
pub const DEFAULT_WEBDRIVER_URL: &str = "http://localhost:9515";
pub const HTTP_TIMEOUT_SECS: u64 = 60;

// Schedule
pub const DEFAULT_CYCLE_HOURS: u64 = 8;

// Logging
pub const DEFAULT_LOG_DIR: &str = "logs";
pub const LOG_FILE_PREFIX: &str = "sei_capture";
pub const LOG_FILES_KEPT: usize = 3;
pub const NOISY_TARGETS: &[&str] = &["reqwest", "hyper", "hyper_util", "rustls", "html5ever", "selectors"];

// Reporting: per-technician daily goal, by box
pub const DEFAULT_DAILY_GOAL: u32 = 4;
pub const DAILY_GOALS: &[(&str, u32)] = &[
    ("MGI-SGP-DECIPEX-CGPAG-ANIST", 4),
    ("MGI-SGP-DECIPEX-CGPAG-BENESP", 7),
    ("MGI-SGP-DECIPEX-CGPAG-CIVAC", 7),
    ("MGI-SGP-DECIPEX-CGPAG-CIVPAS", 7),
    ("MGI-SGP-DECIPEX-CGPAG-CIVRES", 4),
    ("MGI-SGP-DECIPEX-CGPAG-DEVIR", 7),
    ("MGI-SGP-DECIPEX-CGPAG-ESTPEN", 7),
    ("MGI-SGP-DECIPEX-CGPAG-EXANTE", 6),
    ("MGI-SGP-DECIPEX-CGPAG-JUD", 4),
    ("MGI-SGP-DECIPEX-CGPAG-MILREP", 4),
    ("MGI-SGP-DECIPEX-CGPAG-REVER", 6),
    ("MGI-SGP-DECIPEX-CGPAG-REPER", 4),
];
