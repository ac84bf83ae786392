use mongodb::{
    bson::doc,
    options::IndexOptions,
    Database, IndexModel,
};

pub async fn ensure_indexes(db: &Database) -> Result<(), String> {
    // users: one profile per identity provider subject
    {
        let col = db.collection::<mongodb::bson::Document>("users");
        let model = IndexModel::builder()
            .keys(doc! { "auth0Id": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();

        col.create_index(model, None)
            .await
            .map_err(|e| e.to_string())?;
    }

    // orders: "my orders" lists by user, newest first
    {
        let col = db.collection::<mongodb::bson::Document>("orders");
        let model = IndexModel::builder()
            .keys(doc! { "user": 1, "createdAt": -1 })
            .build();

        col.create_index(model, None)
            .await
            .map_err(|e| e.to_string())?;
    }

    // restaurants: search always filters by city
    {
        let col = db.collection::<mongodb::bson::Document>("restaurants");
        let model = IndexModel::builder()
            .keys(doc! { "city": 1 })
            .build();

        // search still works without it, only slower
        if let Err(e) = col.create_index(model, None).await {
            tracing::warn!(error = %e, "restaurants.city index not created");
        }
    }

    Ok(())
}
