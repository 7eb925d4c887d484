//! Process-start configuration: carrier vocabulary, shipping rates and
//! free-shipping policy.
//!
//! All tables here are immutable after construction and are shared by
//! reference through the application state. The city/area vocabulary is the
//! carrier's accepted list; keys are the Arabic spellings customers type
//! into the landing forms.

use std::collections::HashMap;

use rust_decimal::Decimal;

/// Carrier-accepted city/area vocabulary with Arabic→English translation.
#[derive(Clone, Debug)]
pub struct CarrierDirectory {
    cities: HashMap<&'static str, &'static str>,
    areas: HashMap<&'static str, &'static str>,
    /// Fallback pair for unrecognized input: the platform's home region.
    pub default_city: &'static str,
    pub default_area: &'static str,
}

impl CarrierDirectory {
    pub fn egypt() -> Self {
        let cities = HashMap::from([
            ("الشرقية", "Sharqia"),
            ("الزقازيق", "Sharqia"),
            ("القاهرة", "Cairo"),
            ("الجيزة", "Giza"),
            ("الإسكندرية", "Alexandria"),
            ("أسوان", "Aswan"),
            ("أسيوط", "Asyut"),
            ("بني سويف", "BeniSuef"),
            ("البحيرة", "Behira"),
            ("دمياط", "Damietta"),
            ("الفيوم", "Faiyum"),
            ("الغربية", "Gharbia"),
            ("الإسماعيلية", "Ismailia"),
            ("كفر الشيخ", "Kafr El-Sheikh"),
            ("الأقصر", "Luxor"),
            ("المنوفية", "Monufia"),
            ("المنيا", "Menya"),
            ("قنا", "Qena"),
            ("البحر الأحمر", "Red Sea"),
            ("المنصورة", "Mansoura"),
            ("بورسعيد", "Port Said"),
            ("سوهاج", "Sohag"),
            ("السويس", "Suez"),
            ("مطروح", "Matrouh"),
            ("شمال سيناء", "North Sinai"),
            ("جنوب سيناء", "South Sinai"),
            ("الوادي الجديد", "New Valley"),
            ("بنها", "Banha"),
            ("طنطا", "Tanta"),
            ("دمنهور", "Damanhour"),
            ("العريش", "El Arish"),
            ("شرم الشيخ", "Sharm El-Sheikh"),
            ("الغردقة", "Hurghada"),
            ("مرسى مطروح", "Marsa Matruh"),
            ("العين السخنة", "Ain Sokhna"),
            ("مدينة السادس من أكتوبر", "6th of October"),
            ("مدينة العاشر من رمضان", "10th of Ramadan City"),
            ("العاصمة الإدارية", "New Administrative Capital"),
            ("مدينة الشيخ زايد", "El Sheikh Zayed"),
            ("مدينة بدر", "Badr City"),
            ("مدينة العبور", "El Obour"),
            ("الساحل الشمالي", "North Coast"),
            ("الجونة", "El Gouna"),
        ]);

        let areas = HashMap::from([
            // Sharqia
            ("الزقازيق", "Zagazig"),
            ("حي الزهور", "Zagazig"),
            ("أبو كبير", "Abu Kabir"),
            ("ههيا", "Hehya"),
            ("فاقوس", "Faqous"),
            ("الصالحية", "El Salheya"),
            ("ديرب نجم", "Deirb Negm"),
            ("الحسينية", "El Husseiniya"),
            ("أولاد صقر", "Awlad Saqr"),
            ("كفر صقر", "Kafr Saqr"),
            ("بلبيس", "Bilbeis"),
            ("أبو حماد", "Abu Hammad"),
            ("الإبراهيمية", "El Ibrahimiya"),
            ("القنايات", "El Qanayat"),
            ("القرين", "El Qurein"),
            ("منيا القمح", "Minya El Qamh"),
            ("مشتول السوق", "Mashtol Al Souq"),
            // Cairo
            ("المعادي", "Maadi"),
            ("وسط البلد", "Downtown"),
            ("مدينة نصر", "Nasr City"),
            ("القاهرة الجديدة", "New Cairo"),
            ("حلوان", "Helwan"),
            ("عين شمس", "Ain Shams"),
            ("مصر الجديدة", "Masr El Gadida"),
            ("هليوبوليس", "Heliopolis"),
            ("الزمالك", "Zamalek"),
            ("المنيل", "Manial"),
            ("الزيتون", "El Zayton"),
            ("المرج", "El Marg"),
            ("المقطم", "El Mokattam"),
            ("البساتين", "El Basatin"),
            ("شبرا", "Shubra"),
            ("الرحاب", "Al Rehab"),
            ("التجمع الخامس", "The 5th Settlement"),
            ("مدينتي", "Madinaty"),
            ("الشروق", "Al Shorouk"),
            // Giza
            ("الدقي", "Dokki"),
            ("المهندسين", "Mohandisen"),
            ("العجوزة", "Al Agouzah"),
            ("إمبابة", "Imbaba"),
            ("بولاق الدكرور", "Bolak Al Dakrour"),
            ("الهرم", "Haram"),
            ("فيصل", "Faisal"),
            ("حدائق الأهرام", "Hadayk Ahram"),
            ("الوراق", "Al Warak"),
            ("كرداسة", "Kerdasa"),
            ("العمرانية", "Omrania"),
            ("الشيخ زايد", "Sheikh Zayed"),
            ("السادس من أكتوبر", "6th of October"),
            // Alexandria
            ("سيدي جابر", "Sidi Gaber"),
            ("الرمل", "El-Raml"),
            ("المنتزة", "Montaza"),
            ("المعمورة", "Al Mamurah"),
            ("أبو قير", "Abu Qir"),
            ("العجمي", "El-Agamy"),
            ("الدخيلة", "Dekhela"),
            ("برج العرب", "Borg al arab"),
            ("سموحة", "Smouha"),
            ("سيدي بشر", "Sidi Bishr"),
            ("ميامي", "Miami"),
            ("ستانلي", "Stanley"),
            ("كليوباترا", "Cleopatra"),
            ("جليم", "Gleem"),
            ("لوران", "Laurent"),
            ("العصافرة", "Asafra"),
            ("محرم بك", "Moharram Bek"),
            ("كرموز", "Karmouz"),
            // Delta and canal
            ("المحلة الكبرى", "El Mahalla El Kubra"),
            ("ميت غمر", "Mit Ghamr"),
            ("طلخا", "Talkha"),
            ("دسوق", "Desouk"),
            ("بورفؤاد", "Port Fuad"),
        ]);

        Self {
            cities,
            areas,
            default_city: "Sharqia",
            default_area: "Zagazig",
        }
    }

    /// Translate a city name into the carrier vocabulary. Already-canonical
    /// English names pass through unchanged.
    pub fn city(&self, input: &str) -> Option<&'static str> {
        if let Some(en) = self.cities.get(input) {
            return Some(en);
        }
        self.cities.values().find(|en| **en == input).copied()
    }

    /// Translate an area name into the carrier vocabulary.
    pub fn area(&self, input: &str) -> Option<&'static str> {
        if let Some(en) = self.areas.get(input) {
            return Some(en);
        }
        self.areas.values().find(|en| **en == input).copied()
    }

    pub fn cities(&self) -> &HashMap<&'static str, &'static str> {
        &self.cities
    }

    pub fn areas(&self) -> &HashMap<&'static str, &'static str> {
        &self.areas
    }
}

/// Flat per-region shipping rates plus a fixed handling fee.
#[derive(Clone, Debug)]
pub struct ShippingRates {
    rates: HashMap<&'static str, Decimal>,
    pub default_rate: Decimal,
    pub handling_fee: Decimal,
}

impl ShippingRates {
    pub fn egypt() -> Self {
        let rates = HashMap::from([
            ("Sharqia", Decimal::new(40, 0)),
            ("Cairo", Decimal::new(60, 0)),
            ("Giza", Decimal::new(60, 0)),
            ("Alexandria", Decimal::new(70, 0)),
            ("Mansoura", Decimal::new(55, 0)),
            ("Gharbia", Decimal::new(55, 0)),
        ]);
        Self {
            rates,
            default_rate: Decimal::new(80, 0),
            handling_fee: Decimal::new(5, 0),
        }
    }

    /// Region rate plus handling fee; unknown regions get the default rate.
    pub fn cost_for(&self, region: &str) -> Decimal {
        let rate = self.rates.get(region).copied().unwrap_or(self.default_rate);
        rate + self.handling_fee
    }
}

/// Thresholds governing when the platform absorbs the shipping cost.
#[derive(Clone, Debug)]
pub struct FreeShippingPolicy {
    /// Commission level at which shipping becomes free.
    pub profit_threshold: Decimal,
    /// Smallest order profit the platform will accept; informational, used
    /// by cart suggestions on the landing side.
    pub min_profit: Decimal,
}

impl Default for FreeShippingPolicy {
    fn default() -> Self {
        Self {
            profit_threshold: Decimal::new(100, 0),
            min_profit: Decimal::new(15, 0),
        }
    }
}

/// Everything the request handlers need, built once in `main`.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub carrier: CarrierDirectory,
    pub shipping: ShippingRates,
    pub free_shipping: FreeShippingPolicy,
}

impl AppConfig {
    pub fn egypt() -> Self {
        Self {
            carrier: CarrierDirectory::egypt(),
            shipping: ShippingRates::egypt(),
            free_shipping: FreeShippingPolicy::default(),
        }
    }
}
