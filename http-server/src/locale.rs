use axum::{extract::FromRequestParts, http::request::Parts};
use std::convert::Infallible;

/// Supported UI locales. Routes are locale-prefixed (`/{locale}/...`);
/// an unknown prefix falls back to the default.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Locale {
    En,
    #[default]
    PtBr,
    Es,
}

impl Locale {
    pub fn parse(s: &str) -> Locale {
        match s {
            "en" => Locale::En,
            "pt-BR" => Locale::PtBr,
            "es" => Locale::Es,
            _ => Locale::default(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::PtBr => "pt-BR",
            Locale::Es => "es",
        }
    }

    pub fn messages(&self) -> &'static Messages {
        match self {
            Locale::En => &EN,
            Locale::PtBr => &PT_BR,
            Locale::Es => &ES,
        }
    }
}

/// Human-facing response messages, one table per locale.
pub struct Messages {
    pub login_success: &'static str,
    pub profile_completed: &'static str,
    pub deposit_confirmed: &'static str,
    pub withdrawal_requested: &'static str,
    pub wager_placed: &'static str,
    pub pool_opened: &'static str,
    pub pool_settled: &'static str,
    pub referral_recorded: &'static str,
    pub commissions_withdrawn: &'static str,
}

static EN: Messages = Messages {
    login_success: "Login successful",
    profile_completed: "Profile completed",
    deposit_confirmed: "Deposit confirmed",
    withdrawal_requested: "Withdrawal requested, awaiting settlement",
    wager_placed: "Wager placed",
    pool_opened: "Pool opened",
    pool_settled: "Pool settled",
    referral_recorded: "Referral recorded",
    commissions_withdrawn: "Commissions withdrawn to wallet",
};

static PT_BR: Messages = Messages {
    login_success: "Login realizado com sucesso",
    profile_completed: "Perfil completado",
    deposit_confirmed: "Depósito confirmado",
    withdrawal_requested: "Saque solicitado, aguardando confirmação",
    wager_placed: "Aposta realizada",
    pool_opened: "Bolão aberto",
    pool_settled: "Bolão encerrado",
    referral_recorded: "Indicação registrada",
    commissions_withdrawn: "Comissões transferidas para a carteira",
};

static ES: Messages = Messages {
    login_success: "Inicio de sesión exitoso",
    profile_completed: "Perfil completado",
    deposit_confirmed: "Depósito confirmado",
    withdrawal_requested: "Retiro solicitado, esperando confirmación",
    wager_placed: "Apuesta realizada",
    pool_opened: "Pozo abierto",
    pool_settled: "Pozo liquidado",
    referral_recorded: "Referido registrado",
    commissions_withdrawn: "Comisiones transferidas a la billetera",
};

// Extractor: reads the locale from the first path segment, falling back
// to the default for anything unrecognized.
impl<S> FromRequestParts<S> for Locale
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let first = parts
            .uri
            .path()
            .trim_start_matches('/')
            .split('/')
            .next()
            .unwrap_or("");
        Ok(Locale::parse(first))
    }
}
