//! Scripted chat assistant.
//!
//! The widget either sends free text (classified by keyword) or the `action`
//! of an option it was offered. Unknown keys fall back to [`ResponseKey::Default`].
//! Keyword checks run in order; the first matching group wins.

use serde::Serialize;

/// One selectable button under a bot message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChatOption {
    pub id: &'static str,
    pub label: &'static str,
    pub action: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BotResponse {
    pub key: &'static str,
    pub text: &'static str,
    pub options: &'static [ChatOption],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKey {
    Welcome,
    Services,
    Quote,
    Maintenance,
    Payment,
    Contact,
    Portfolio,
    Menu,
    Plans,
    Default,
}

impl ResponseKey {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "welcome" => Some(Self::Welcome),
            "services" => Some(Self::Services),
            "quote" => Some(Self::Quote),
            "maintenance" => Some(Self::Maintenance),
            "payment" => Some(Self::Payment),
            "contact" => Some(Self::Contact),
            "portfolio" => Some(Self::Portfolio),
            "menu" => Some(Self::Menu),
            "plans" => Some(Self::Plans),
            "default" => Some(Self::Default),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Welcome => "welcome",
            Self::Services => "services",
            Self::Quote => "quote",
            Self::Maintenance => "maintenance",
            Self::Payment => "payment",
            Self::Contact => "contact",
            Self::Portfolio => "portfolio",
            Self::Menu => "menu",
            Self::Plans => "plans",
            Self::Default => "default",
        }
    }
}

// ---------------------------------------------------------------------------
// Canned content
// ---------------------------------------------------------------------------

const fn opt(id: &'static str, label: &'static str, action: &'static str) -> ChatOption {
    ChatOption { id, label, action }
}

const BACK: ChatOption = opt("back", "Voltar ao Menu", "menu");

pub const MENU_OPTIONS: &[ChatOption] = &[
    opt("services", "Nossos Serviços", "services"),
    opt("quote", "Solicitar Orçamento", "quote"),
    opt("maintenance", "Manutenção", "maintenance"),
    opt("payment", "Pagamentos", "payment"),
    opt("contact", "Contacto", "contact"),
    opt("portfolio", "Ver Portfólio", "portfolio"),
];

const SERVICES_OPTIONS: &[ChatOption] = &[opt("quote", "Solicitar Orçamento", "quote"), BACK];
const QUOTE_OPTIONS: &[ChatOption] = &[opt("form", "Ir para o Formulário", "form"), BACK];
const MAINTENANCE_OPTIONS: &[ChatOption] = &[opt("plans", "Ver Planos", "plans"), BACK];
const PAYMENT_OPTIONS: &[ChatOption] = &[opt("code", "Pagar com Código", "code"), BACK];
const CONTACT_OPTIONS: &[ChatOption] = &[opt("whatsapp", "Abrir WhatsApp", "whatsapp"), BACK];
const PORTFOLIO_OPTIONS: &[ChatOption] = &[opt("see", "Ver Portfólio", "scrollProjects"), BACK];
const PLANS_OPTIONS: &[ChatOption] = &[opt("sub", "Assinar Plano", "subscribe"), BACK];

/// Actions the widget handles client-side (navigation); they never reach the bot.
pub const CLIENT_ACTIONS: &[&str] = &["form", "whatsapp", "code", "subscribe", "scrollProjects"];

pub fn response(key: ResponseKey) -> BotResponse {
    let (text, options) = match key {
        ResponseKey::Welcome => (
            "Olá! Sou o BW, assistente virtual da BragaWork. Como posso ajudá-lo hoje?",
            MENU_OPTIONS,
        ),
        ResponseKey::Services => (
            "Oferecemos os seguintes serviços:\n\n\
             • Desenvolvimento de Sites - Sites modernos e responsivos\n\
             • Aplicativos Mobile - Apps para iOS e Android\n\
             • Design UI/UX - Interfaces elegantes\n\
             • SEO - Otimização para buscadores\n\
             • Manutenção - Suporte contínuo\n\n\
             Quer saber mais sobre algum serviço específico?",
            SERVICES_OPTIONS,
        ),
        ResponseKey::Quote => (
            "Para solicitar um orçamento, você pode:\n\n\
             1. Preencher nosso formulário de orçamento online\n\
             2. Entrar em contacto pelo WhatsApp: +351 927 512 038\n\
             3. Enviar email para: bragawork01@gmail.com\n\n\
             O formulário online é a forma mais rápida e permite detalhar seu projeto.",
            QUOTE_OPTIONS,
        ),
        ResponseKey::Maintenance => (
            "Oferecemos planos de manutenção mensal:\n\n\
             • Manutenção de Site: €50/mês\n\
             • Manutenção de App: €100/mês\n\n\
             Inclui atualizações, correções de bugs, backups e suporte técnico.\n\n\
             Deseja saber mais sobre os planos?",
            MAINTENANCE_OPTIONS,
        ),
        ResponseKey::Payment => (
            "Aceitamos os seguintes métodos de pagamento:\n\n\
             • Cartão de crédito/débito\n\
             • Transferência bancária\n\
             • Pagamento por código (para projetos específicos)\n\n\
             Se você recebeu um código de pagamento, pode usá-lo na página de Pagamento por Código.",
            PAYMENT_OPTIONS,
        ),
        ResponseKey::Contact => (
            "Você pode entrar em contacto conosco por:\n\n\
             📧 Email: bragawork01@gmail.com\n\
             📱 WhatsApp: +351 927 512 038\n\
             📸 Instagram: @braga.work\n\n\
             Estamos disponíveis 24/7 para atendê-lo!",
            CONTACT_OPTIONS,
        ),
        ResponseKey::Portfolio => (
            "Temos diversos projetos realizados!\n\n\
             Você pode ver nosso portfólio completo na seção Projetos do site. \
             Lá você encontrará exemplos de sites e aplicativos que desenvolvemos.\n\n\
             Deseja ver agora?",
            PORTFOLIO_OPTIONS,
        ),
        ResponseKey::Menu => ("Como mais posso ajudá-lo?", MENU_OPTIONS),
        ResponseKey::Plans => (
            "Detalhes dos planos de manutenção:\n\n\
             🌐 SITE (€50/mês):\n\
             • Atualizações de segurança\n\
             • Correções de bugs\n\
             • Backup semanal\n\
             • Suporte por email/WhatsApp\n\n\
             📱 APP (€100/mês):\n\
             • Tudo do plano Site\n\
             • Atualizações nas lojas\n\
             • Monitoramento de performance\n\
             • Suporte prioritário",
            PLANS_OPTIONS,
        ),
        ResponseKey::Default => (
            "Desculpe, não entendi sua pergunta. Posso ajudá-lo com informações sobre \
             nossos serviços, orçamentos, manutenção ou pagamentos.",
            MENU_OPTIONS,
        ),
    };
    BotResponse {
        key: key.as_str(),
        text,
        options,
    }
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

const KEYWORDS: &[(ResponseKey, &[&str])] = &[
    (ResponseKey::Services, &["serviço", "servico"]),
    (ResponseKey::Quote, &["orçamento", "orcamento", "preço", "preco"]),
    (ResponseKey::Maintenance, &["manutenção", "manutencao", "suporte"]),
    (ResponseKey::Payment, &["pagar", "pagamento", "código", "codigo"]),
    (ResponseKey::Contact, &["contato", "contacto", "whatsapp", "email"]),
    (ResponseKey::Portfolio, &["projeto", "portfólio", "portfolio"]),
    (ResponseKey::Welcome, &["olá", "ola", "oi", "bom dia", "boa tarde"]),
];

/// Pick a response for free text. Matching is case-insensitive substring search.
pub fn classify(message: &str) -> ResponseKey {
    let lower = message.to_lowercase();
    KEYWORDS
        .iter()
        .find(|(_, words)| words.iter().any(|w| lower.contains(w)))
        .map(|(key, _)| *key)
        .unwrap_or(ResponseKey::Default)
}

/// Resolve an option action (or response key) to a reply.
pub fn respond(action: &str) -> BotResponse {
    response(ResponseKey::parse(action).unwrap_or(ResponseKey::Default))
}

/// Reply to whichever of `action` / `message` the widget sent; `action` wins.
/// Returns `None` when neither carries content.
pub fn reply(message: Option<&str>, action: Option<&str>) -> Option<BotResponse> {
    if let Some(action) = action.map(str::trim).filter(|a| !a.is_empty()) {
        return Some(respond(action));
    }
    message
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(|m| response(classify(m)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_handles_accents_and_case() {
        assert_eq!(classify("Quais SERVIÇOS vocês têm?"), ResponseKey::Services);
        assert_eq!(classify("quero um orcamento"), ResponseKey::Quote);
        assert_eq!(classify("Qual o preço?"), ResponseKey::Quote);
        assert_eq!(classify("preciso de suporte"), ResponseKey::Maintenance);
        assert_eq!(classify("tenho um código"), ResponseKey::Payment);
        assert_eq!(classify("qual o vosso email"), ResponseKey::Contact);
        assert_eq!(classify("mostrem o portfólio"), ResponseKey::Portfolio);
        assert_eq!(classify("Olá"), ResponseKey::Welcome);
        assert_eq!(classify("boa tarde"), ResponseKey::Welcome);
    }

    #[test]
    fn classify_uses_first_matching_group() {
        // Mentions both services and a price: services is checked first.
        assert_eq!(classify("preço dos serviços"), ResponseKey::Services);
    }

    #[test]
    fn unknown_text_falls_back_to_default() {
        assert_eq!(classify("xyz"), ResponseKey::Default);
        let r = response(ResponseKey::Default);
        assert_eq!(r.options, MENU_OPTIONS);
    }

    #[test]
    fn respond_resolves_actions() {
        assert_eq!(respond("plans").key, "plans");
        assert_eq!(respond("menu").text, "Como mais posso ajudá-lo?");
        assert_eq!(respond("nonsense").key, "default");
    }

    #[test]
    fn every_option_has_back_or_menu() {
        for key in [
            ResponseKey::Services,
            ResponseKey::Quote,
            ResponseKey::Maintenance,
            ResponseKey::Payment,
            ResponseKey::Contact,
            ResponseKey::Portfolio,
            ResponseKey::Plans,
        ] {
            let r = response(key);
            assert!(r.options.iter().any(|o| o.action == "menu"), "{key:?}");
        }
    }

    #[test]
    fn reply_prefers_action_and_rejects_empty() {
        assert_eq!(reply(Some("orçamento"), Some("contact")).unwrap().key, "contact");
        assert_eq!(reply(Some("orçamento"), None).unwrap().key, "quote");
        assert_eq!(reply(Some("   "), Some("")), None);
        assert_eq!(reply(None, None), None);
    }
}
