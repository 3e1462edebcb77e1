//! Caption prompt construction

use crate::shared::ad_brief::{GenerateAdRequest, MAX_AVOID_TEXTS};

/// Marker terminating each caption block in the model output
pub const VARIANT_DELIMITER: &str = "<<<VARIANT_END>>>";

/// System message sent with every generation
pub const SYSTEM_PROMPT: &str =
    "너는 인스타그램 광고 카피라이터야. 한국어로 쓰고, 지침을 엄격히 따른다.";

fn join_or(items: Option<&[String]>, sep: &str, fallback: &str) -> String {
    let joined = items
        .unwrap_or_default()
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(sep);
    if joined.is_empty() {
        fallback.to_string()
    } else {
        joined
    }
}

/// Render the user prompt for a brief
pub fn build_prompt(req: &GenerateAdRequest) -> String {
    let area_keywords = join_or(Some(req.area_keywords.as_slice()), ", ", "");
    let reference_links = join_or(req.reference_links.as_deref(), "\n", "없음");
    let product_keywords = join_or(req.product_service_keywords.as_deref(), ", ", "미지정");
    let targets = join_or(req.target_customers.as_deref(), ", ", "일반 대중");
    let promotions = join_or(req.promotions.as_deref(), " / ", "없음");
    let instagram = req
        .instagram_id
        .as_deref()
        .map(|id| id.trim().trim_start_matches('@'))
        .filter(|id| !id.is_empty())
        .map(|id| format!("@{id}"))
        .unwrap_or_else(|| "없음".to_string());

    let image_hint = match req.image_urls.as_deref() {
        Some(urls) if !urls.is_empty() => format!("\n- 참고 이미지 링크: {}", urls.join(", ")),
        _ => String::new(),
    };

    let avoid = match req.avoid_texts.as_deref() {
        Some(texts) if !texts.is_empty() => {
            let items: Vec<&str> = texts.iter().take(MAX_AVOID_TEXTS).map(String::as_str).collect();
            format!("\n[피해야 할 문구/컨셉]\n- {}", items.join("\n- "))
        }
        _ => String::new(),
    };

    format!(
        r#"
[목표]
인스타그램 피드용 광고 캡션 {num_variants}개를 작성한다.

[브리프]
- 가게명: {store_name}
- 업종: {category}
- 지역/상권 키워드: {area_keywords}
- 주소: {address}
- 가격대: {price}
- 영업 시간: {hours}
- 가게 소개: {store_intro}
- 제품/서비스 키워드: {product_keywords}
- 타깃 고객: {targets}
- 진행 중 프로모션/이벤트: {promotions}
- 인스타그램 ID: {instagram}{image_hint}
- 참고 링크:
{reference_links}
{avoid}

[톤]
{tone_rule}

[작성 규칙]
- 한국어, 300자 이내. 자연스럽게 지역/상권 키워드 최소 1개 포함.
- 홍보글은 가게 특성과 고객에게 줄 가치가 명확히 드러나야 함
- 해시태그는 검색 최적화(SEO) 관점에서 작성
- 가게 특징(업종·메인 서비스)과 혜택/차별점을 1~2개로 명확히.
- 인스타 핸들(ID)이 있으면 본문에 한 번만 표기.
- 이모지는 과하지 않게 핵심 위치에만 사용(톤에 맞게).
- 금지: 과장된 단정(최고, 100% 보장, 완벽), 과도한 특수문자, 허위·건강 효능.
- 해시태그는 마지막 줄에만, 띄어쓰기로 구분하여 정확히 {hashtag_limit}개 생성.
- 해시태그는 #기호로만 시작하고 문장부호/이모지 금지.
- 홍보글 밑, 해시태그 전 반드시 가게명과 가게 주소를 각각 📍 이모지 뒤에 표기할 것. (ex. 📍 묭이카페\n 📍 소행성 행성로 88-2)
- 가게 인스타그램 아이디는 @기호 뒤에 띄어쓰기 없이 작성할 것

[출력 포맷]
다음 형식을 각 캡션마다 엄격히 따르고, 각 캡션 블록 끝에 '{delimiter}' 구분자를 붙인다.

캡션 본문 한 문단
빈 줄 1개
#해시태그들(#으로 시작, 공백으로 구분)
{delimiter}
"#,
        num_variants = req.num_variants,
        store_name = req.store_name.trim(),
        category = req.category.trim(),
        address = req.address.trim(),
        price = req.price.trim(),
        hours = req.business_hours.display(),
        store_intro = req.store_intro.trim(),
        tone_rule = req.tone().style_rule(),
        hashtag_limit = req.hashtag_limit,
        delimiter = VARIANT_DELIMITER,
    )
}
