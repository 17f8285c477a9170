/// 경매 저장
pub const INSERT_AUCTION: &str = r#"
    INSERT INTO auctions (id, product_name, category, description, condition, status, created_at, end_time)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
"#;

/// 경매 조회
pub const GET_AUCTION: &str = "SELECT id, product_name, category, description, condition, status, created_at, end_time FROM auctions WHERE id = $1";

/// 조건별 경매 조회 (category 일치, product_name 부분 일치)
pub const FIND_AUCTIONS: &str = r#"
    SELECT id, product_name, category, description, condition, status, created_at, end_time
    FROM auctions
    WHERE status = $1
      AND ($2::TEXT IS NULL OR category = $2)
      AND ($3::TEXT IS NULL OR product_name ILIKE '%' || $3 || '%')
    ORDER BY created_at DESC
"#;

/// 만료된 진행 중 경매 조회
pub const FIND_EXPIRED_AUCTIONS: &str = r#"
    SELECT id, product_name, category, description, condition, status, created_at, end_time
    FROM auctions
    WHERE status = $1 AND end_time <= $2
"#;

/// 경매 종료 (ACTIVE 인 경우에만)
pub const COMPLETE_AUCTION: &str = "UPDATE auctions SET status = $1 WHERE id = $2 AND status = $3";

/// 경매 존재 여부
pub const AUCTION_EXISTS: &str = "SELECT EXISTS(SELECT 1 FROM auctions WHERE id = $1)";

/// 사용자 조회
pub const GET_USER: &str = "SELECT id, name FROM users WHERE id = $1";
