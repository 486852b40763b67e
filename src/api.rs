pub mod models; // ドメインエンティティとAPIレスポンス型
pub mod resolver; // 入力文字列の正規化
pub mod youtube; // YouTube Data API v3 クライアント
