//! Localized display strings and screen rendering
//!
//! Maps semantic `Screen`s to transport-ready text and menus. Labels are
//! keyed by closed enums, so a menu can only ever offer codes the state
//! machine knows how to decode.

use crate::db::{ApplicationSummary, ApplicationStatus};
use crate::state_machine::{
    AmountCode, AmountSelection, ApplicantType, Choice, CollateralType, FinancingType, Language,
    Screen,
};

/// A labeled menu entry; `code` round-trips through `Choice::parse`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuButton {
    pub label: String,
    pub code: String,
}

impl MenuButton {
    pub fn choice(label: impl Into<String>, choice: Choice) -> Self {
        Self {
            label: label.into(),
            code: choice.code().to_string(),
        }
    }
}

/// Which input affordance accompanies a prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuSpec {
    None,
    Inline(Vec<MenuButton>),
    /// Contact-sharing button.
    Contact { button: String },
    /// Remove any on-screen input affordance.
    RemoveInput,
}

/// A screen rendered for one language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub text: String,
    pub menu: MenuSpec,
}

pub fn back_label(lang: Language) -> &'static str {
    match lang {
        Language::Uz => "🔙 Orqaga",
        Language::Ru => "🔙 Назад",
    }
}

/// The recognized "back" phrase in either supported language.
pub fn is_back_label(text: &str) -> bool {
    let text = text.trim();
    text == back_label(Language::Uz) || text == back_label(Language::Ru)
}

pub fn financing_label(financing: FinancingType, lang: Language) -> &'static str {
    match (financing, lang) {
        (FinancingType::Islamic, Language::Uz) => {
            "🕌 Islomiy moliyalashtirish 300 000,0 AQSh dollardan"
        }
        (FinancingType::Islamic, Language::Ru) => {
            "🕌 Исламское финансирование от 300 000,0 Долл США"
        }
        (FinancingType::Cash, Language::Uz) => "💵 Naqd pul krediti 300 mln so'mgacha",
        (FinancingType::Cash, Language::Ru) => "💵 Кредит наличными до 300 млн сум",
        (FinancingType::LargeCredit, Language::Uz) => "🏦 300 mln so'mdan ortiq kredit",
        (FinancingType::LargeCredit, Language::Ru) => "🏦 Кредит свыше 300 млн сум",
    }
}

pub fn amount_label(code: AmountCode, lang: Language) -> &'static str {
    match (code, lang) {
        (AmountCode::CashUpTo300M, Language::Uz) => "💵 Naqd pul krediti 300 mln so'mgacha",
        (AmountCode::CashUpTo300M, Language::Ru) => "💵 Кредит наличными до 300 млн сум",
        (AmountCode::CashForeign, Language::Uz) => "💵 Naqd pul krediti AQSh dollarida",
        (AmountCode::CashForeign, Language::Ru) => "💵 Кредит наличными в долларах США",
        (AmountCode::WorkingCapitalUpTo10B, Language::Uz) => {
            "🏢 Aylanma mablag'larni to'ldirish yoki asosiy vositalarni sotib olish uchun 10 mlrd so'mgacha"
        }
        (AmountCode::WorkingCapitalUpTo10B, Language::Ru) => {
            "🏢 Кредит на пополнение оборотных средств, или на приобретение основных средств до 10 млрд сум"
        }
        (AmountCode::Above10B, Language::Uz) => {
            "🏦 Turli maqsadlar uchun 10 mlrd so'mdan ortiq moliyalashtirish"
        }
        (AmountCode::Above10B, Language::Ru) => {
            "🏦 Финансирование свыше 10 млрд сум на разные цели"
        }
        (AmountCode::IslamicFrom300K, Language::Uz) => {
            "🕌 Islomiy moliyalashtirish 300 000,0 AQSh dollardan"
        }
        (AmountCode::IslamicFrom300K, Language::Ru) => {
            "🕌 Исламское финансирование от 300 000,0 Долл США"
        }
    }
}

pub fn applicant_label(applicant: ApplicantType, lang: Language) -> &'static str {
    match (applicant, lang) {
        (ApplicantType::Individual, Language::Uz) => "👤 O'zim uchun (jismoniy shaxs)",
        (ApplicantType::Individual, Language::Ru) => "👤 На Себя как физ лицо",
        (ApplicantType::SoleProprietor, Language::Uz) => {
            "📝 Patent, mening yakka tartibdagi tadbirkorligim bor"
        }
        (ApplicantType::SoleProprietor, Language::Ru) => {
            "📝 На Патент, у меня частное предпринимательство"
        }
        (ApplicantType::Firm, Language::Uz) => "🏢 Firma uchun",
        (ApplicantType::Firm, Language::Ru) => "🏢 На фирму хочу",
    }
}

pub fn collateral_label(collateral: CollateralType, lang: Language) -> &'static str {
    match (collateral, lang) {
        (CollateralType::RealEstate, Language::Uz) => "🏠 Ko'chmas mulk",
        (CollateralType::RealEstate, Language::Ru) => "🏠 Недвижимость",
        (CollateralType::Vehicle, Language::Uz) => "🚗 Transport vositalari",
        (CollateralType::Vehicle, Language::Ru) => "🚗 Транспортные средства",
    }
}

fn manual_entry_label(lang: Language) -> &'static str {
    match lang {
        Language::Uz => "Summani qo'lda kiriting",
        Language::Ru => "Ввести сумму вручную",
    }
}

fn phone_button_label(lang: Language) -> &'static str {
    match lang {
        Language::Uz => "📱 Raqamni yuborish",
        Language::Ru => "📱 Отправить номер",
    }
}

/// Human-readable amount, used in the reviewer summary and the listing.
pub fn amount_display(amount: &AmountSelection, financing: FinancingType, lang: Language) -> String {
    match amount {
        AmountSelection::Code { code } => amount_label(*code, lang).to_string(),
        AmountSelection::Manual { value } => {
            let unit = match (financing, lang) {
                (FinancingType::Islamic, _) => "USD",
                (_, Language::Uz) => "so'm",
                (_, Language::Ru) => "сум",
            };
            format!("{} {unit}", format_number(*value))
        }
    }
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value}")
    }
}

fn back_button(lang: Language) -> MenuButton {
    MenuButton::choice(back_label(lang), Choice::Back)
}

/// Render a screen for a language.
pub fn render(screen: &Screen, lang: Language) -> Rendered {
    match screen {
        Screen::Welcome => Rendered {
            // New users have no stored language yet; the welcome prompt
            // is always in the default language, with both picks offered.
            text: "👋 Assalomu alaykum! Kredit botiga xush kelibsiz. Tilni tanlang:".to_string(),
            menu: MenuSpec::Inline(vec![
                MenuButton::choice("🇺🇿 O'zbekcha", Choice::Language(Language::Uz)),
                MenuButton::choice("🇷🇺 Русский", Choice::Language(Language::Ru)),
            ]),
        },
        Screen::AskFullName => Rendered {
            text: match lang {
                Language::Uz => "📝 Familiya va ismingizni kiriting:",
                Language::Ru => "📝 Введите вашу фамилию и имя:",
            }
            .to_string(),
            menu: MenuSpec::RemoveInput,
        },
        Screen::FinancingMenu => {
            let mut buttons: Vec<MenuButton> = [
                FinancingType::Islamic,
                FinancingType::Cash,
                FinancingType::LargeCredit,
            ]
            .into_iter()
            .map(|f| MenuButton::choice(financing_label(f, lang), Choice::Financing(f)))
            .collect();
            buttons.push(back_button(lang));
            Rendered {
                text: match lang {
                    Language::Uz => "💵 Qanday turdagi moliyalashtirishni xohlaysiz?",
                    Language::Ru => "💵 Какой вид финансирования вы хотите?",
                }
                .to_string(),
                menu: MenuSpec::Inline(buttons),
            }
        }
        Screen::AmountMenu { financing } => {
            let mut buttons: Vec<MenuButton> = crate::state_machine::rules::amount_codes(*financing)
                .iter()
                .map(|&code| MenuButton::choice(amount_label(code, lang), Choice::Amount(code)))
                .collect();
            buttons.push(MenuButton::choice(
                manual_entry_label(lang),
                Choice::EnterAmountManually,
            ));
            buttons.push(back_button(lang));
            Rendered {
                text: match lang {
                    Language::Uz => "💰 Qancha miqdorda mablag' kerak?",
                    Language::Ru => "💰 Сколько вы хотите?",
                }
                .to_string(),
                menu: MenuSpec::Inline(buttons),
            }
        }
        Screen::ManualAmountPrompt { financing } => Rendered {
            text: match (financing, lang) {
                (FinancingType::Islamic, Language::Uz) => {
                    "AQSh dollarida summani kiriting (kamida 300,000):"
                }
                (FinancingType::Islamic, Language::Ru) => {
                    "Введите сумму в долларах США (минимум 300,000):"
                }
                (FinancingType::Cash, Language::Uz) => "So'm yoki dollar miqdorini kiriting:",
                (FinancingType::Cash, Language::Ru) => "Введите сумму в сумах или долларах:",
                (FinancingType::LargeCredit, Language::Uz) => {
                    "So'mda summani kiriting (kamida 300 mln):"
                }
                (FinancingType::LargeCredit, Language::Ru) => {
                    "Введите сумму в сумах (минимум 300 млн):"
                }
            }
            .to_string(),
            menu: MenuSpec::None,
        },
        Screen::AmountParseError => Rendered {
            text: match lang {
                Language::Uz => {
                    "❌ Iltimos, raqamli qiymat kiriting (masalan: 300000 yoki 350000.50):"
                }
                Language::Ru => {
                    "❌ Пожалуйста, введите числовое значение (например: 300000 или 350000.50):"
                }
            }
            .to_string(),
            menu: MenuSpec::None,
        },
        Screen::AmountBelowMinimum { financing } => Rendered {
            text: match (financing, lang) {
                (FinancingType::Islamic, Language::Uz) => {
                    "❌ Islomiy moliyalashtirish uchun minimal summa 300,000 AQSh dollar. Iltimos, to'g'ri summani kiriting:"
                }
                (FinancingType::Islamic, Language::Ru) => {
                    "❌ Минимальная сумма для исламского финансирования - 300,000 USD. Пожалуйста, введите корректную сумму:"
                }
                (FinancingType::Cash, Language::Uz) => {
                    "❌ Summa 0 dan katta bo'lishi kerak. Iltimos, to'g'ri summani kiriting:"
                }
                (FinancingType::Cash, Language::Ru) => {
                    "❌ Сумма должна быть больше 0. Пожалуйста, введите корректную сумму:"
                }
                (FinancingType::LargeCredit, Language::Uz) => {
                    "❌ Ushbu turdagi kredit uchun minimal summa 300 mln so'm. Iltimos, to'g'ri summani kiriting:"
                }
                (FinancingType::LargeCredit, Language::Ru) => {
                    "❌ Минимальная сумма для этого типа кредита - 300 млн сум. Пожалуйста, введите корректную сумму:"
                }
            }
            .to_string(),
            menu: MenuSpec::None,
        },
        Screen::ApplicantMenu { restricted } => {
            let options: &[ApplicantType] = if *restricted {
                &[ApplicantType::Firm]
            } else {
                &[
                    ApplicantType::Individual,
                    ApplicantType::SoleProprietor,
                    ApplicantType::Firm,
                ]
            };
            let mut buttons: Vec<MenuButton> = options
                .iter()
                .map(|&a| MenuButton::choice(applicant_label(a, lang), Choice::Applicant(a)))
                .collect();
            buttons.push(back_button(lang));
            Rendered {
                text: match lang {
                    Language::Uz => "👤 Kim uchun moliyalashtirish kerak?",
                    Language::Ru => "👤 На физическое лицо или на фирму хотите?",
                }
                .to_string(),
                menu: MenuSpec::Inline(buttons),
            }
        }
        Screen::CollateralMenu => {
            let mut buttons: Vec<MenuButton> = [CollateralType::RealEstate, CollateralType::Vehicle]
                .into_iter()
                .map(|c| MenuButton::choice(collateral_label(c, lang), Choice::Collateral(c)))
                .collect();
            buttons.push(back_button(lang));
            Rendered {
                text: match lang {
                    Language::Uz => "🏠 Qanday garov kafolati berasiz?",
                    Language::Ru => "🏠 В залог что хотите предоставить?",
                }
                .to_string(),
                menu: MenuSpec::Inline(buttons),
            }
        }
        Screen::CollateralDetailsPrompt { collateral } => Rendered {
            text: match (collateral, lang) {
                (CollateralType::RealEstate, Language::Uz) => {
                    "🏡 Ko'chmas mulk haqida ma'lumot kiriting (manzil, maydoni, qimmatligi):"
                }
                (CollateralType::RealEstate, Language::Ru) => {
                    "🏡 Введите информацию о недвижимости (адрес, площадь, стоимость):"
                }
                (CollateralType::Vehicle, Language::Uz) => {
                    "🚗 Transport vositasi haqida ma'lumot kiriting (markasi, modeli, yili, qimmatligi):"
                }
                (CollateralType::Vehicle, Language::Ru) => {
                    "🚗 Введите информацию о транспортном средстве (марка, модель, год, стоимость):"
                }
            }
            .to_string(),
            menu: MenuSpec::None,
        },
        Screen::PhonePrompt => Rendered {
            text: match lang {
                Language::Uz => {
                    "📱 Telefon raqamingizni kiriting yoki 'Raqamni yuborish' tugmasini bosing:"
                }
                Language::Ru => {
                    "📱 Введите ваш телефонный номер или нажмите кнопку 'Отправить номер':"
                }
            }
            .to_string(),
            menu: MenuSpec::Contact {
                button: phone_button_label(lang).to_string(),
            },
        },
        Screen::PhoneTypeWarning => Rendered {
            text: match lang {
                Language::Uz => {
                    "⚠️ Iltimos, telefon raqamingizni 'Raqamni yuborish' tugmasi orqali yuboring!"
                }
                Language::Ru => {
                    "⚠️ Пожалуйста, отправьте номер телефона с помощью кнопки 'Отправить номер'!"
                }
            }
            .to_string(),
            menu: MenuSpec::Contact {
                button: phone_button_label(lang).to_string(),
            },
        },
        Screen::ContactAccepted => Rendered {
            text: match lang {
                Language::Uz => "✅ Telefon raqamingiz qabul qilindi!",
                Language::Ru => "✅ Ваш номер телефона принят!",
            }
            .to_string(),
            menu: MenuSpec::RemoveInput,
        },
        Screen::Finished => Rendered {
            text: match lang {
                Language::Uz => {
                    "✅ Ushbu xizmat bepul, bank xodimi tez orada siz bilan bog'lanadi. Rahmat!"
                }
                Language::Ru => {
                    "✅ Данная услуга бесплатно, сотрудник банка свяжется с Вами в ближайшее время для консультации, спасибо Вам!"
                }
            }
            .to_string(),
            menu: MenuSpec::None,
        },
        Screen::LargeAmountAdvisory => Rendered {
            text: match lang {
                Language::Uz => {
                    "💼 10 mlrd so'mdan ortiq kreditlar uchun korporativ kreditlash bo'yicha menejer siz bilan shaxsan bog'lanadi."
                }
                Language::Ru => {
                    "💼 Для кредитов свыше 10 млрд сум: С Вами лично свяжется руководитель по корпоративному кредитованию."
                }
            }
            .to_string(),
            menu: MenuSpec::None,
        },
        Screen::PersistFailed => Rendered {
            text: match lang {
                Language::Uz => "❌ Xatolik yuz berdi! Iltimos, qaytadan urinib ko'ring.",
                Language::Ru => "❌ Произошла ошибка! Пожалуйста, попробуйте снова.",
            }
            .to_string(),
            menu: MenuSpec::None,
        },
        Screen::ReviewPanel => Rendered {
            text: match lang {
                Language::Uz => "⚙️ Admin paneli",
                Language::Ru => "⚙️ Админ панель",
            }
            .to_string(),
            menu: MenuSpec::Inline(vec![MenuButton::choice(
                match lang {
                    Language::Uz => "📄 Barcha arizalar",
                    Language::Ru => "📄 Все заявки",
                },
                Choice::ReviewApplications,
            )]),
        },
        Screen::ReviewDenied => Rendered {
            text: match lang {
                Language::Uz => "⚠️ Ruxsat yo'q!",
                Language::Ru => "⚠️ Нет доступа!",
            }
            .to_string(),
            menu: MenuSpec::None,
        },
    }
}

/// Reviewer notification sent when an application completes.
pub fn review_notification(
    lang: Language,
    full_name: &str,
    phone: &str,
    financing: FinancingType,
    amount: &AmountSelection,
    applicant: ApplicantType,
    collateral: CollateralType,
    details: &str,
) -> String {
    let header = match lang {
        Language::Uz => "📌 Yangi ariza!",
        Language::Ru => "📌 Новая заявка!",
    };
    format!(
        "{header}\n\n👤 Ism: {full_name}\n📞 Tel: {phone}\n💳 Tur: {}\n💰 Summa: {}\n🏛 Arizachi: {}\n🏠 Garov turi: {}\n📝 Garov haqida: {details}",
        financing_label(financing, lang),
        amount_display(amount, financing, lang),
        applicant_label(applicant, lang),
        collateral_label(collateral, lang),
    )
}

fn status_emoji(status: ApplicationStatus) -> &'static str {
    match status {
        ApplicationStatus::Approved => "✅",
        ApplicationStatus::Rejected => "❌",
        ApplicationStatus::Pending => "🕒",
    }
}

/// The reviewer-facing listing of all persisted applications.
pub fn application_list(lang: Language, apps: &[ApplicationSummary]) -> String {
    if apps.is_empty() {
        return match lang {
            Language::Uz => "🙅‍♂️ Hozircha arizalar mavjud emas!",
            Language::Ru => "🙅‍♂️ Нет доступных заявок!",
        }
        .to_string();
    }

    let mut out = match lang {
        Language::Uz => "📄 Barcha arizalar:\n\n",
        Language::Ru => "📄 Все заявки:\n\n",
    }
    .to_string();

    for app in apps {
        let name = app.full_name.as_deref().unwrap_or("-");
        let handle = match &app.handle {
            Some(h) => format!("@{h}"),
            None => match lang {
                Language::Uz => "Yo'q".to_string(),
                Language::Ru => "Нет".to_string(),
            },
        };
        out.push_str(&format!(
            "{} 🆔 ID: {}\n👤 Ism: {name}\n📱 Username: {handle}\n💳 Tur: {}\n💰 Summa: {}\n👥 Arizachi: {}\n🏠 Garov: {}\n📅 Sana: {}\n\n",
            status_emoji(app.status),
            app.id,
            financing_label(app.financing, lang),
            amount_display(&app.amount, app.financing, lang),
            applicant_label(app.applicant, lang),
            collateral_label(app.collateral, lang),
            app.created_at.format("%Y-%m-%d %H:%M"),
        ));
    }
    out
}
