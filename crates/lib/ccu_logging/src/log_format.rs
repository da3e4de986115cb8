/// Output format of the `fmt` layer, `AKAMAI_CCU_LOG_FORMAT`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}
